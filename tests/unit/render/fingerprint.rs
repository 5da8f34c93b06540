use super::*;
use crate::composition::model::{Composition, ids};
use crate::eval::evaluator::Evaluator;
use crate::foundation::core::FrameIndex;
use crate::settings::model::Settings;

fn comp() -> Composition {
    Composition::from_settings(&Settings {
        person_quote: "Hello".to_owned(),
        video_duration: 4.0,
        ..Settings::default()
    })
}

#[test]
fn same_frame_same_fingerprint() {
    let c = comp();
    let a = fingerprint_state(&Evaluator::evaluate(&c, FrameIndex(53)));
    let b = fingerprint_state(&Evaluator::evaluate(&c.clone(), FrameIndex(53)));
    assert_eq!(a, b);
}

#[test]
fn any_visible_change_changes_fingerprint() {
    let c = comp();
    let base = Evaluator::evaluate(&c, FrameIndex(53));
    let fp = fingerprint_state(&base);

    let mut text = base.clone();
    text.elements.get_mut(ids::QUOTE_TEXT).unwrap().text = Some("Hello".to_owned());
    assert_ne!(fingerprint_state(&text), fp);

    let mut opacity = base.clone();
    opacity.elements.get_mut(ids::LOGO).unwrap().opacity = 0.999;
    assert_ne!(fingerprint_state(&opacity), fp);

    let mut moved = base.clone();
    moved.elements.get_mut(ids::AMBIENT).unwrap().transform.translate.x += 1e-9;
    assert_ne!(fingerprint_state(&moved), fp);

    let mut frame = base;
    frame.frame = FrameIndex(54);
    assert_ne!(fingerprint_state(&frame), fp);
}

#[test]
fn text_and_label_do_not_alias() {
    let c = comp();
    let mut a = Evaluator::evaluate(&c, FrameIndex(0));
    let mut b = a.clone();
    let e = a.elements.get_mut(ids::BACKGROUND).unwrap();
    e.text = Some("ab".to_owned());
    let e = b.elements.get_mut(ids::BACKGROUND).unwrap();
    e.labels.insert("a".to_owned(), "b".to_owned());
    assert_ne!(fingerprint_state(&a), fingerprint_state(&b));
}

#[test]
fn display_is_fixed_width_hex() {
    let fp = FrameFingerprint { hi: 1, lo: 0xff };
    assert_eq!(fp.to_string(), "000000000000000100000000000000ff");
}
