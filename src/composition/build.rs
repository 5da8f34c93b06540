use std::collections::BTreeMap;

use crate::{
    animation::ease::Ease,
    animation::proc::Periodic,
    audio::envelope::FadeEnvelope,
    composition::model::{
        AudioPlan, Composition, CurveKind, Element, ElementBinding, Property, Style,
        TimingAdjustment, ids,
    },
    foundation::core::{COMPOSITION_FPS, FrameIndex, Vec2},
    settings::catalog,
    settings::model::Settings,
};

/// Frames the logo takes to fade in from frame 0.
pub const LOGO_FADE_FRAMES: u64 = 20;
/// Frame where the quote block starts its entrance.
pub const QUOTE_BLOCK_ANCHOR: u64 = 30;
/// Delay between the quote block entrance and the first typed character.
pub const QUOTE_TEXT_LEAD: u64 = 15;
/// Typing speed of the quote.
pub const TYPING_CHARS_PER_FRAME: f64 = 0.6;
/// Frames the person details take to fade in.
pub const PERSON_FADE_FRAMES: u64 = 30;

const SPRING_DAMPING: f64 = 12.0;
const SPRING_MASS: f64 = 1.0;
const FALLBACK_VIDEO_DURATION_SEC: f64 = 1.0;

/// Asset key of the account owner logo.
pub const OWNER_LOGO_ASSET: &str = "ownerLogo";
/// Asset key of the partner logo.
pub const PARTNER_LOGO_ASSET: &str = "partnerLogo";
/// Asset key of the person photo.
pub const PERSON_IMAGE_ASSET: &str = "personImage";

impl Composition {
    /// Bind the standard testimonial element set to a settings record.
    ///
    /// Never fails: out-of-range timing values are clamped to the nearest valid value and
    /// recorded in [`Composition::adjustments`]; an unknown music track yields no audio.
    #[tracing::instrument(skip(settings), fields(duration = settings.video_duration))]
    pub fn from_settings(settings: &Settings) -> Self {
        let fps = COMPOSITION_FPS;
        let mut adjustments = Vec::new();

        let requested_secs = settings.video_duration;
        let duration_secs = if requested_secs.is_finite() && requested_secs > 0.0 {
            requested_secs
        } else {
            adjust(
                &mut adjustments,
                "videoDuration",
                requested_secs,
                FALLBACK_VIDEO_DURATION_SEC,
            )
        };
        let total_frames = fps.secs_to_frames_round(duration_secs).max(1);
        let timeline_secs = fps.frames_to_secs(total_frames);

        let reveal_anchor = reveal_anchor_frame(settings, total_frames, &mut adjustments);
        let audio = audio_plan(settings, timeline_secs, &mut adjustments);

        let mut assets = BTreeMap::new();
        for (key, value) in [
            (OWNER_LOGO_ASSET, &settings.owner_account_image),
            (PARTNER_LOGO_ASSET, &settings.partner_image),
            (PERSON_IMAGE_ASSET, &settings.person_image),
        ] {
            if let Some(path) = non_empty(value) {
                assets.insert(key.to_owned(), path.to_owned());
            }
        }

        let mut logo = Element::new(ids::LOGO, 2);
        logo.images = [OWNER_LOGO_ASSET, PARTNER_LOGO_ASSET]
            .into_iter()
            .filter(|k| assets.contains_key(*k))
            .map(str::to_owned)
            .collect();

        let mut quote_text = Element::new(ids::QUOTE_TEXT, 4);
        quote_text.text = Some(settings.person_quote.clone());

        let mut person = Element::new(ids::PERSON_DETAILS, 5);
        if assets.contains_key(PERSON_IMAGE_ASSET) {
            person.images.push(PERSON_IMAGE_ASSET.to_owned());
        }
        for (label, value) in [
            ("name", &settings.person_name),
            ("title", &settings.person_title),
            ("company", &settings.company_name),
        ] {
            if !value.trim().is_empty() {
                person.labels.insert(label.to_owned(), value.clone());
            }
        }

        let elements = vec![
            Element::new(ids::BACKGROUND, 0),
            Element::new(ids::AMBIENT, 1),
            logo,
            Element::new(ids::QUOTE_BLOCK, 3),
            quote_text,
            person,
        ];

        let quote_anchor = FrameIndex(QUOTE_BLOCK_ANCHOR);
        let bindings = vec![
            bind(
                ids::AMBIENT,
                Property::Rotation,
                0,
                CurveKind::Periodic(Periodic::sine(3.0, 240.0, 0.0)),
            ),
            bind(
                ids::AMBIENT,
                Property::Translate,
                0,
                CurveKind::PeriodicOffset {
                    x: Periodic::sine(8.0, 300.0, 0.0),
                    y: Periodic::sine(6.0, 180.0, std::f64::consts::FRAC_PI_2),
                },
            ),
            bind(
                ids::LOGO,
                Property::Opacity,
                0,
                CurveKind::Fade {
                    duration_frames: LOGO_FADE_FRAMES,
                    ease: Ease::OutQuad,
                },
            ),
            bind(
                ids::QUOTE_BLOCK,
                Property::Opacity,
                quote_anchor.0,
                spring_scalar(0.0),
            ),
            bind(
                ids::QUOTE_BLOCK,
                Property::Scale,
                quote_anchor.0,
                spring_scalar(0.8),
            ),
            bind(
                ids::QUOTE_BLOCK,
                Property::Translate,
                quote_anchor.0,
                spring_offset(Vec2::new(0.0, 40.0)),
            ),
            bind(
                ids::QUOTE_TEXT,
                Property::VisibleText,
                quote_anchor.0 + QUOTE_TEXT_LEAD,
                CurveKind::Typed {
                    chars_per_frame: TYPING_CHARS_PER_FRAME,
                },
            ),
            bind(
                ids::PERSON_DETAILS,
                Property::Opacity,
                reveal_anchor.0,
                CurveKind::Fade {
                    duration_frames: PERSON_FADE_FRAMES,
                    ease: Ease::Linear,
                },
            ),
            bind(
                ids::PERSON_DETAILS,
                Property::Translate,
                reveal_anchor.0,
                spring_offset(Vec2::new(0.0, 24.0)),
            ),
        ];

        tracing::debug!(
            total_frames,
            reveal_anchor = reveal_anchor.0,
            has_audio = audio.is_some(),
            adjustments = adjustments.len(),
            "composition bound"
        );

        Self {
            fps,
            duration: FrameIndex(total_frames),
            style: Style {
                palette: settings.color_palette.clone(),
                primary_font: settings.primary_font.clone(),
                secondary_font: settings.secondary_font.clone(),
            },
            assets,
            elements,
            bindings,
            audio,
            adjustments,
        }
    }
}

fn bind(element: &str, property: Property, anchor: u64, curve: CurveKind) -> ElementBinding {
    ElementBinding {
        element: element.to_owned(),
        property,
        anchor: FrameIndex(anchor),
        curve,
    }
}

fn spring_scalar(from: f64) -> CurveKind {
    CurveKind::Spring {
        from,
        damping: SPRING_DAMPING,
        mass: SPRING_MASS,
    }
}

fn spring_offset(from: Vec2) -> CurveKind {
    CurveKind::SpringOffset {
        from,
        damping: SPRING_DAMPING,
        mass: SPRING_MASS,
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn adjust(out: &mut Vec<TimingAdjustment>, field: &str, requested: f64, applied: f64) -> f64 {
    tracing::warn!(field, requested, applied, "timing value clamped");
    out.push(TimingAdjustment {
        field: field.to_owned(),
        requested,
        applied,
    });
    applied
}

/// Clamp `value` into `[lo, hi]`, recording an adjustment when it moves. NaN maps to `lo`.
fn clamp_timing(out: &mut Vec<TimingAdjustment>, field: &str, value: f64, lo: f64, hi: f64) -> f64 {
    let clamped = if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    };
    if clamped != value {
        adjust(out, field, value, clamped)
    } else {
        clamped
    }
}

fn reveal_anchor_frame(
    settings: &Settings,
    total_frames: u64,
    adjustments: &mut Vec<TimingAdjustment>,
) -> FrameIndex {
    let fps = COMPOSITION_FPS;
    let last = total_frames - 1;
    let requested = settings.speaker_reveal_timing;
    let secs = clamp_timing(
        adjustments,
        "speakerRevealTiming",
        requested,
        0.0,
        f64::INFINITY,
    );
    let frame = if secs.is_infinite() {
        u64::MAX
    } else {
        fps.secs_to_frames_floor(secs)
    };
    if frame > last {
        adjust(
            adjustments,
            "speakerRevealTiming",
            requested,
            fps.frames_to_secs(last),
        );
        return FrameIndex(last);
    }
    FrameIndex(frame)
}

fn audio_plan(
    settings: &Settings,
    timeline_secs: f64,
    adjustments: &mut Vec<TimingAdjustment>,
) -> Option<AudioPlan> {
    let track = match catalog::resolve(&settings.background_music) {
        Ok(Some(track)) => track,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "background music unavailable");
            return None;
        }
    };

    let start_sec = clamp_timing(
        adjustments,
        "musicStartTime",
        settings.music_start_time,
        0.0,
        track.duration_sec,
    );
    let fade_in_sec = if settings.music_fade_in {
        clamp_timing(
            adjustments,
            "musicFadeInDuration",
            settings.music_fade_in_duration,
            0.0,
            timeline_secs,
        )
    } else {
        0.0
    };
    let fade_out_sec = if settings.music_fade_out {
        clamp_timing(
            adjustments,
            "musicFadeOutDuration",
            settings.music_fade_out_duration,
            0.0,
            timeline_secs,
        )
    } else {
        0.0
    };
    let end_sec = timeline_secs.min(track.duration_sec - start_sec).max(0.0);

    Some(AudioPlan {
        gain: settings.music_gain(),
        start_sec,
        envelope: FadeEnvelope {
            fade_in_sec,
            fade_out_sec,
            end_sec,
        },
        track,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/composition/build.rs"]
mod tests;
