use super::*;
use crate::settings::model::Settings;

fn comp() -> Composition {
    Composition::from_settings(&Settings {
        person_quote: "Great team".to_owned(),
        video_duration: 10.0,
        background_music: "corporate1".to_owned(),
        ..Settings::default()
    })
}

#[test]
fn built_composition_validates() {
    comp().validate().unwrap();
}

#[test]
fn json_roundtrip_is_lossless() {
    let c = comp();
    let json = c.to_json_pretty().unwrap();
    let back = Composition::from_json_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn validate_rejects_unknown_element() {
    let mut c = comp();
    c.bindings[0].element = "ghost".to_owned();
    let err = c.validate().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn validate_rejects_mismatched_curve() {
    let mut c = comp();
    c.bindings.push(ElementBinding {
        element: ids::LOGO.to_owned(),
        property: Property::Translate,
        anchor: FrameIndex(0),
        curve: CurveKind::Typed {
            chars_per_frame: 1.0,
        },
    });
    assert!(c.validate().is_err());
}

#[test]
fn validate_rejects_zero_duration_and_duplicate_ids() {
    let mut c = comp();
    c.duration = FrameIndex(0);
    assert!(c.validate().is_err());

    let mut c = comp();
    let dup = c.elements[0].clone();
    c.elements.push(dup);
    assert!(c.validate().is_err());
}

#[test]
fn validate_rejects_oversized_fades() {
    let mut c = comp();
    if let Some(audio) = c.audio.as_mut() {
        audio.envelope.fade_in_sec = 60.0;
    }
    assert!(c.validate().is_err());
}

#[test]
fn without_asset_drops_only_that_asset() {
    let mut c = comp();
    c.assets.insert("ownerLogo".to_owned(), "o.png".to_owned());
    c.assets.insert("partnerLogo".to_owned(), "p.png".to_owned());
    let trimmed = c.without_asset("ownerLogo");
    assert!(!trimmed.assets.contains_key("ownerLogo"));
    assert!(trimmed.assets.contains_key("partnerLogo"));
    assert_eq!(trimmed.bindings, c.bindings);
}

#[test]
fn media_position_follows_start_offset() {
    let c = comp();
    let audio = c.audio.as_ref().unwrap();
    assert_eq!(audio.media_position(0.0), audio.start_sec);
    assert_eq!(audio.media_position(1e9), audio.track.duration_sec);
}

#[test]
fn curve_kind_sampling_forms() {
    let fade = CurveKind::Fade {
        duration_frames: 10,
        ease: Ease::Linear,
    };
    assert_eq!(fade.sample_scalar(5, 0), Some(0.5));
    assert_eq!(fade.sample_offset(5, 0), None);

    let typed = CurveKind::Typed {
        chars_per_frame: 1.0,
    };
    assert_eq!(typed.sample_scalar(5, 0), None);

    let wobble = CurveKind::PeriodicOffset {
        x: Periodic::sine(1.0, 4.0, 0.0),
        y: Periodic::sine(0.0, 4.0, 0.0),
    };
    let v = wobble.sample_offset(1, 0).unwrap();
    assert!((v.x - 1.0).abs() < 1e-9);
}
