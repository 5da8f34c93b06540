use std::collections::BTreeMap;
use std::path::Path;

use crate::{
    animation::curve,
    animation::ease::Ease,
    animation::proc::Periodic,
    audio::envelope::FadeEnvelope,
    foundation::core::{Fps, FrameIndex, FrameRange, Vec2},
    foundation::error::{QuoteReelError, QuoteReelResult},
    settings::catalog::TrackInfo,
    settings::model::ColorPalette,
};

/// Element ids bound by [`Composition::from_settings`].
pub mod ids {
    /// Full-frame background, never animated.
    pub const BACKGROUND: &str = "background";
    /// Owner/partner logo pair.
    pub const LOGO: &str = "logo";
    /// Card holding the quote.
    pub const QUOTE_BLOCK: &str = "quoteBlock";
    /// Quote text with typing reveal.
    pub const QUOTE_TEXT: &str = "quoteText";
    /// Person image, name, title and company.
    pub const PERSON_DETAILS: &str = "personDetails";
    /// Decorative background motion.
    pub const AMBIENT: &str = "ambient";
}

/// A complete, immutable testimonial composition.
///
/// Derived once from a settings record (see [`Composition::from_settings`]) and shared by the
/// live preview and the offline renderer. It is plain data: JSON round-trips are lossless, so
/// the exported document evaluates exactly like the in-memory one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    /// Timeline frame rate.
    pub fps: Fps,
    /// Total composition duration in frames.
    pub duration: FrameIndex, // total frames
    /// Static styling forwarded to the presentation layer.
    pub style: Style,
    /// Image assets keyed by stable asset keys.
    pub assets: BTreeMap<String, String>,
    /// Elements in paint order.
    pub elements: Vec<Element>,
    /// Property animations.
    pub bindings: Vec<ElementBinding>,
    /// Background music, if any.
    pub audio: Option<AudioPlan>,
    /// Timing values clamped while deriving this composition.
    #[serde(default)]
    pub adjustments: Vec<TimingAdjustment>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    pub palette: ColorPalette,
    pub primary_font: String,
    pub secondary_font: String,
}

/// One visual element and its static content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Element {
    /// Stable element id.
    pub id: String,
    /// Paint order, lower first.
    pub z: i32,
    /// Asset keys shown by this element, in slot order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Full text. A [`Property::VisibleText`] binding reveals it progressively.
    #[serde(default)]
    pub text: Option<String>,
    /// Static captions (name, title, ...).
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Element {
    pub(crate) fn new(id: &str, z: i32) -> Self {
        Self {
            id: id.to_owned(),
            z,
            images: Vec::new(),
            text: None,
            labels: BTreeMap::new(),
        }
    }
}

/// Binds one element property to a curve anchored at a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBinding {
    /// Target element id.
    pub element: String,
    /// Animated property.
    pub property: Property,
    /// Frame where the curve starts.
    pub anchor: FrameIndex,
    /// Curve kind and parameters.
    pub curve: CurveKind,
}

/// Animatable element property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Property {
    /// Multiplied into the element opacity.
    Opacity,
    /// Multiplied into the element scale.
    Scale,
    /// Added to the element translation.
    Translate,
    /// Added to the element rotation (degrees).
    Rotation,
    /// Replaces the visible text with a typed prefix.
    VisibleText,
}

/// Curve kind with its parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum CurveKind {
    /// Fade 0 -> 1 over `duration_frames`.
    Fade { duration_frames: u64, ease: Ease },
    /// Scalar spring from `from` to 1.
    Spring { from: f64, damping: f64, mass: f64 },
    /// Offset spring from `from` to zero.
    SpringOffset { from: Vec2, damping: f64, mass: f64 },
    /// Typing reveal.
    Typed { chars_per_frame: f64 },
    /// Scalar periodic motion.
    Periodic(Periodic),
    /// 2D periodic motion.
    PeriodicOffset { x: Periodic, y: Periodic },
}

impl CurveKind {
    /// Sample as a scalar. `None` when this curve has no scalar form.
    pub fn sample_scalar(&self, frame: u64, anchor: u64) -> Option<f64> {
        match self {
            Self::Fade {
                duration_frames,
                ease,
            } => Some(curve::fade_opacity(frame, anchor, *duration_frames, *ease)),
            Self::Spring { from, damping, mass } => Some(
                from + (1.0 - from) * curve::spring_approach(frame, anchor, *damping, *mass),
            ),
            Self::Periodic(p) => Some(p.sample(frame.saturating_sub(anchor))),
            Self::SpringOffset { .. } | Self::Typed { .. } | Self::PeriodicOffset { .. } => None,
        }
    }

    /// Sample as an offset. `None` when this curve has no 2D form.
    pub fn sample_offset(&self, frame: u64, anchor: u64) -> Option<Vec2> {
        match self {
            Self::SpringOffset { from, damping, mass } => Some(curve::translate_from_spring(
                frame, anchor, *from, *damping, *mass,
            )),
            Self::PeriodicOffset { x, y } => {
                let local = frame.saturating_sub(anchor);
                Some(Vec2::new(x.sample(local), y.sample(local)))
            }
            _ => None,
        }
    }

    fn fits(&self, property: Property) -> bool {
        match property {
            Property::Opacity | Property::Scale | Property::Rotation => {
                matches!(
                    self,
                    Self::Fade { .. } | Self::Spring { .. } | Self::Periodic(_)
                )
            }
            Property::Translate => {
                matches!(self, Self::SpringOffset { .. } | Self::PeriodicOffset { .. })
            }
            Property::VisibleText => matches!(self, Self::Typed { .. }),
        }
    }
}

/// Background music resolved for a composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioPlan {
    /// Catalog entry.
    pub track: TrackInfo,
    /// Media second that plays at timeline second 0.
    pub start_sec: f64,
    /// Volume target in `[0, 1]`.
    pub gain: f32,
    /// Fade envelope in timeline seconds.
    pub envelope: FadeEnvelope,
}

impl AudioPlan {
    /// Media position for a timeline second.
    pub fn media_position(&self, timeline_sec: f64) -> f64 {
        (self.start_sec + timeline_sec.max(0.0)).min(self.track.duration_sec)
    }
}

/// A timing value that was out of range and got clamped.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingAdjustment {
    /// Settings field name as the host spells it.
    pub field: String,
    /// Value found in the settings record.
    pub requested: f64,
    /// Value actually used.
    pub applied: f64,
}

impl Composition {
    /// Total frames (`> 0` for any validated composition).
    pub fn total_frames(&self) -> u64 {
        self.duration.0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.duration.0)
    }

    /// The whole timeline as a range.
    pub fn range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: self.duration,
        }
    }

    /// Clamp `frame` into `[0, total_frames)`.
    pub fn clamp_frame(&self, frame: FrameIndex) -> FrameIndex {
        self.range().clamp(frame)
    }

    /// Look up an element by id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Anchor frame of the first binding of `property` on `element`.
    pub fn anchor_of(&self, element: &str, property: Property) -> Option<FrameIndex> {
        self.bindings
            .iter()
            .find(|b| b.element == element && b.property == property)
            .map(|b| b.anchor)
    }

    /// Copy of this composition with `asset_key` removed, so elements render without it.
    pub fn without_asset(&self, asset_key: &str) -> Self {
        let mut out = self.clone();
        out.assets.remove(asset_key);
        out
    }

    /// Validate static invariants. Used for compositions imported from JSON; compositions built
    /// by [`Composition::from_settings`] satisfy them by construction.
    pub fn validate(&self) -> QuoteReelResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(QuoteReelError::validation("fps must be > 0"));
        }
        if self.duration.0 == 0 {
            return Err(QuoteReelError::validation("duration must be > 0 frames"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for e in &self.elements {
            if !seen.insert(e.id.as_str()) {
                return Err(QuoteReelError::validation(format!(
                    "duplicate element id '{}'",
                    e.id
                )));
            }
        }

        for b in &self.bindings {
            if !seen.contains(b.element.as_str()) {
                return Err(QuoteReelError::validation(format!(
                    "binding references unknown element '{}'",
                    b.element
                )));
            }
            if !b.curve.fits(b.property) {
                return Err(QuoteReelError::validation(format!(
                    "curve {:?} cannot drive {:?} on '{}'",
                    b.curve, b.property, b.element
                )));
            }
            if let CurveKind::Typed { chars_per_frame } = b.curve
                && !(chars_per_frame.is_finite() && chars_per_frame > 0.0)
            {
                return Err(QuoteReelError::validation(
                    "typed reveal chars_per_frame must be > 0",
                ));
            }
        }

        if let Some(audio) = &self.audio {
            let e = &audio.envelope;
            let dur = self.duration_secs();
            if !(0.0..=1.0).contains(&audio.gain) {
                return Err(QuoteReelError::validation("audio gain must be in [0, 1]"));
            }
            if e.fade_in_sec > dur + 1e-9 || e.fade_out_sec > dur + 1e-9 {
                return Err(QuoteReelError::validation(
                    "fade durations must not exceed the video duration",
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate a composition from JSON.
    pub fn from_json_str(s: &str) -> QuoteReelResult<Self> {
        let comp: Self = serde_json::from_str(s)?;
        comp.validate()?;
        Ok(comp)
    }

    /// Read, parse and validate a composition JSON file.
    pub fn from_path(path: &Path) -> QuoteReelResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Pretty JSON for hand-off.
    pub fn to_json_pretty(&self) -> QuoteReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn fits(binding: &ElementBinding) -> bool {
        binding.curve.fits(binding.property)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
