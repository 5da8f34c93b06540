use super::*;
use crate::composition::model::ids;
use crate::settings::model::Settings;

fn comp() -> Composition {
    Composition::from_settings(&Settings {
        person_quote: "Hello".to_owned(),
        video_duration: 3.0,
        speaker_reveal_timing: 1.0,
        ..Settings::default()
    })
}

fn range(a: u64, b: u64) -> FrameRange {
    FrameRange::new(FrameIndex(a), FrameIndex(b)).unwrap()
}

#[test]
fn range_is_returned_in_frame_order() {
    let r = OfflineRenderer::new(comp(), OfflineOpts::default()).unwrap();
    let frames = r.render_range(range(40, 60)).unwrap();
    assert_eq!(frames.len(), 20);
    for (i, s) in frames.iter().enumerate() {
        assert_eq!(s.frame, FrameIndex(40 + i as u64));
    }
    assert_eq!(
        frames[13].element(ids::QUOTE_TEXT).unwrap().text.as_deref(),
        Some("Hell")
    );
}

#[test]
fn parallel_matches_sequential() {
    let seq = OfflineRenderer::new(comp(), OfflineOpts::default()).unwrap();
    let par = OfflineRenderer::new(
        comp(),
        OfflineOpts {
            parallel: true,
            threads: Some(3),
        },
    )
    .unwrap();
    assert_eq!(
        seq.fingerprint_all().unwrap(),
        par.fingerprint_all().unwrap()
    );
    assert_eq!(
        seq.render_range(range(0, 90)).unwrap(),
        par.render_range(range(0, 90)).unwrap()
    );
}

#[test]
fn rejects_bad_ranges_and_options() {
    let r = OfflineRenderer::new(comp(), OfflineOpts::default()).unwrap();
    assert!(r.render_range(range(5, 5)).is_err());
    assert!(r.fingerprints(range(0, 91)).is_err());
    assert!(
        OfflineRenderer::new(
            comp(),
            OfflineOpts {
                parallel: true,
                threads: Some(0),
            }
        )
        .is_err()
    );

    let mut broken = comp();
    broken.duration = FrameIndex(0);
    assert!(OfflineRenderer::new(broken, OfflineOpts::default()).is_err());
}

#[test]
fn single_frame_clamps_like_the_evaluator() {
    let r = OfflineRenderer::new(comp(), OfflineOpts::default()).unwrap();
    assert_eq!(r.frame(FrameIndex(500)), r.frame(FrameIndex(89)));
}
