use super::*;
use crate::audio::sink::{AudioEventKind, InMemoryAudioSink, SinkOp, SourceId};
use crate::composition::model::ids;
use crate::session::scheduler::ManualFrameScheduler;
use crate::settings::model::AnimationSpeed;

type Player<'a> = PreviewPlayer<&'a mut InMemoryAudioSink, &'a mut ManualFrameScheduler>;

fn settings() -> Settings {
    Settings {
        person_quote: "Hello".to_owned(),
        person_name: "Sam Lee".to_owned(),
        owner_account_image: Some("owner.png".to_owned()),
        video_duration: 10.0,
        speaker_reveal_timing: 5.0,
        background_music: "corporate1".to_owned(),
        music_volume: 80.0,
        music_fade_in_duration: 1.0,
        music_fade_out: false,
        ..Settings::default()
    }
}

fn with_audio() -> PreviewOpts {
    PreviewOpts {
        audio_enabled: true,
        ..PreviewOpts::default()
    }
}

fn frame_at(p: &mut Player<'_>, ms: u64) -> Option<VisualState> {
    assert!(p.scheduler_mut().fire(), "no frame request pending");
    p.on_frame(Duration::from_millis(ms))
}

#[test]
fn session_starts_playing_at_frame_zero() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    let s = p.state();
    assert_eq!(s.current_frame, FrameIndex(0));
    assert!(s.is_playing);
    assert!(!s.audio_enabled);
    assert_eq!(s.speed_factor, 1.0);
    assert_eq!(s.loop_count, 0);
    assert_eq!(p.scheduler().pending().len(), 1);
    assert!(p.audio_sink().ops().is_empty());
}

#[test]
fn frame_loop_keeps_exactly_one_request() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    assert_eq!(frame_at(&mut p, 0).unwrap().frame, FrameIndex(0));
    for i in 1..60 {
        frame_at(&mut p, i * 33).unwrap();
        assert_eq!(p.scheduler().pending().len(), 1);
    }
    assert_eq!(frame_at(&mut p, 2_000).unwrap().frame, FrameIndex(60));
}

#[test]
fn pause_freezes_and_play_resumes_from_same_frame() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    frame_at(&mut p, 0);
    assert_eq!(frame_at(&mut p, 1_000).unwrap().frame, FrameIndex(30));

    p.pause();
    assert_eq!(p.pending_request(), None);
    assert!(p.scheduler().pending().is_empty());
    assert_eq!(p.scheduler().cancelled_count(), 1);
    assert_eq!(p.on_frame(Duration::from_secs(5)), None);
    assert_eq!(p.state().current_frame, FrameIndex(30));
    assert!(!p.state().is_playing);

    p.play();
    assert_eq!(frame_at(&mut p, 61_000).unwrap().frame, FrameIndex(30));
    assert_eq!(frame_at(&mut p, 62_000).unwrap().frame, FrameIndex(60));
}

#[test]
fn restart_returns_to_frame_zero() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());
    frame_at(&mut p, 0);
    frame_at(&mut p, 4_000);
    p.pause();
    p.restart();
    assert!(p.state().is_playing);
    assert_eq!(p.state().current_frame, FrameIndex(0));
    assert_eq!(p.audio_sink().last_seek(SourceId(1)), Some(0.0));
    assert_eq!(frame_at(&mut p, 9_000).unwrap().frame, FrameIndex(0));
}

#[test]
fn scrubbed_reveal_scenario() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    p.pause();

    p.scrub(FrameIndex(149));
    let v = p.visual_state();
    assert_eq!(v.element(ids::PERSON_DETAILS).unwrap().opacity, 0.0);

    p.scrub(FrameIndex(170));
    let o = p.visual_state().element(ids::PERSON_DETAILS).unwrap().opacity;
    assert!(o > 0.0 && o < 1.0);
    assert!(!p.state().is_playing);

    p.scrub(FrameIndex(10_000));
    assert_eq!(p.state().current_frame, FrameIndex(299));
}

#[test]
fn loop_wrap_restarts_audio() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let s = Settings {
        video_duration: 2.0,
        ..settings()
    };
    let mut p = PreviewPlayer::new(&s, &mut sink, &mut sched, with_audio());
    frame_at(&mut p, 0);
    assert_eq!(frame_at(&mut p, 1_980).unwrap().frame, FrameIndex(59));
    assert_eq!(frame_at(&mut p, 2_100).unwrap().frame, FrameIndex(3));
    assert_eq!(p.state().loop_count, 1);
    assert!(p.state().is_playing);

    let seek = p.audio_sink().last_seek(SourceId(1)).unwrap();
    assert!((seek - 0.1).abs() < 1e-6);
    let starts = p
        .audio_sink()
        .ops()
        .iter()
        .filter(|o| matches!(o, SinkOp::Start(_)))
        .count();
    assert_eq!(starts, 2);
    assert_eq!(p.audio_sink().live_sources(), vec![SourceId(1)]);
}

#[test]
fn non_looping_session_stops_on_last_frame() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let s = Settings {
        video_duration: 1.0,
        ..settings()
    };
    let opts = PreviewOpts {
        looping: false,
        audio_enabled: true,
        ..PreviewOpts::default()
    };
    let mut p = PreviewPlayer::new(&s, &mut sink, &mut sched, opts);
    frame_at(&mut p, 0);
    assert_eq!(frame_at(&mut p, 3_000).unwrap().frame, FrameIndex(29));
    assert!(!p.state().is_playing);
    assert_eq!(p.pending_request(), None);
    assert!(p.audio_sink().audible_sources().is_empty());
}

#[test]
fn enabling_audio_mid_play_joins_at_current_offset() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    frame_at(&mut p, 0);
    assert_eq!(frame_at(&mut p, 3_000).unwrap().frame, FrameIndex(90));

    p.toggle_audio(true);
    assert!(p.state().audio_enabled);
    assert_eq!(p.audio_state().active_track.as_deref(), Some("corporate1"));
    let seek = p.audio_sink().last_seek(SourceId(1)).unwrap();
    assert!((seek - 3.0).abs() < 1e-6);
    assert!((p.audio_state().gain - 0.8).abs() < 1e-4);

    p.toggle_audio(false);
    assert!(!p.state().audio_enabled);
    assert!(p.audio_sink().audible_sources().is_empty());
    assert_eq!(frame_at(&mut p, 4_000).unwrap().frame, FrameIndex(120));
}

#[test]
fn rejected_audio_never_stalls_frames() {
    let mut sink = InMemoryAudioSink::new();
    sink.reject_next_start(AudioError::PlaybackRejected("autoplay".to_owned()));
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());

    assert!(p.state().audio_muted);
    assert!(p.drain_notices().contains(&PlayerNotice::AudioFailed(
        AudioError::PlaybackRejected("autoplay".to_owned())
    )));
    frame_at(&mut p, 0);
    assert_eq!(frame_at(&mut p, 1_000).unwrap().frame, FrameIndex(30));

    p.toggle_audio(true);
    assert!(!p.state().audio_muted);
    assert!(p.drain_notices().is_empty());
}

#[test]
fn late_audio_failure_is_reported_once() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());
    p.drain_notices();
    frame_at(&mut p, 0);

    p.handle_audio_event(AudioEvent {
        source: SourceId(1),
        kind: AudioEventKind::Failed("decode".to_owned()),
    });
    assert_eq!(p.drain_notices().len(), 1);
    assert!(p.state().audio_muted);
    assert!(p.audio_sink().live_sources().is_empty());
    assert_eq!(frame_at(&mut p, 500).unwrap().frame, FrameIndex(15));
    assert!(p.drain_notices().is_empty());
}

#[test]
fn unknown_track_is_a_notice_not_an_error() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let s = Settings {
        background_music: "polka9".to_owned(),
        ..settings()
    };
    let mut p = PreviewPlayer::new(&s, &mut sink, &mut sched, with_audio());
    assert_eq!(
        p.drain_notices(),
        vec![PlayerNotice::AudioFailed(AudioError::UnknownTrack(
            "polka9".to_owned()
        ))]
    );
    assert_eq!(p.audio_state().active_track, None);
    assert!(p.audio_sink().ops().is_empty());
    assert!(p.state().is_playing);
}

#[test]
fn clamped_timing_is_reported() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let s = Settings {
        video_duration: 2.0,
        speaker_reveal_timing: 30.0,
        ..settings()
    };
    let mut p = PreviewPlayer::new(&s, &mut sink, &mut sched, PreviewOpts::default());
    let notices = p.drain_notices();
    assert!(notices.iter().any(|n| matches!(
        n,
        PlayerNotice::TimingAdjusted(a) if a.field == "speakerRevealTiming"
    )));
}

#[test]
fn missing_image_drops_only_that_asset() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    p.drain_notices();
    p.scrub(FrameIndex(40));
    assert_eq!(
        p.visual_state().element(ids::LOGO).unwrap().images,
        vec!["owner.png"]
    );

    p.report_asset_failure("ownerLogo", "404");
    let logo = p.visual_state().element(ids::LOGO).cloned().unwrap();
    assert!(logo.images.is_empty());
    assert_eq!(logo.opacity, 1.0);
    assert_eq!(
        p.drain_notices(),
        vec![PlayerNotice::AssetUnavailable {
            key: "ownerLogo".to_owned(),
            reason: "404".to_owned(),
        }]
    );

    p.report_asset_failure("ownerLogo", "404");
    p.report_asset_failure("personImage", "404");
    assert!(p.drain_notices().is_empty());
}

#[test]
fn settings_update_switches_track_and_speed() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    {
        let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());
        frame_at(&mut p, 0);
        assert_eq!(frame_at(&mut p, 500).unwrap().frame, FrameIndex(15));

        let edited = Settings {
            background_music: "ambient1".to_owned(),
            animation_speed: AnimationSpeed::Fast,
            ..settings()
        };
        p.update_settings(&edited);
        assert_eq!(p.state().speed_factor, 1.5);
        assert_eq!(p.state().current_frame, FrameIndex(15));
        assert_eq!(p.audio_state().active_track.as_deref(), Some("ambient1"));
        assert_eq!(p.audio_sink().live_sources(), vec![SourceId(2)]);
        assert!(
            p.audio_sink()
                .ops()
                .contains(&SinkOp::Rate(SourceId(2), 1.5))
        );

        assert_eq!(frame_at(&mut p, 1_500).unwrap().frame, FrameIndex(15));
        assert_eq!(frame_at(&mut p, 2_500).unwrap().frame, FrameIndex(60));
    }
    assert_eq!(sink.max_audible(), 1);
}

#[test]
fn shorter_video_clamps_current_frame() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, PreviewOpts::default());
    frame_at(&mut p, 0);
    frame_at(&mut p, 5_000);
    p.update_settings(&Settings {
        video_duration: 3.0,
        ..settings()
    });
    assert_eq!(p.state().current_frame, FrameIndex(89));
    assert_eq!(p.composition().total_frames(), 90);
}

#[test]
fn shutdown_is_final() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());
    frame_at(&mut p, 0);
    p.shutdown();
    assert!(p.scheduler().pending().is_empty());
    assert!(p.audio_sink().live_sources().is_empty());

    p.play();
    p.restart();
    assert_eq!(p.pending_request(), None);
    assert_eq!(p.on_frame(Duration::from_secs(1)), None);
    assert!(p.audio_sink().live_sources().is_empty());
}

#[test]
fn drop_releases_everything() {
    let mut sink = InMemoryAudioSink::new();
    let mut sched = ManualFrameScheduler::new();
    {
        let mut p = PreviewPlayer::new(&settings(), &mut sink, &mut sched, with_audio());
        frame_at(&mut p, 0);
        frame_at(&mut p, 100);
    }
    assert!(sched.pending().is_empty());
    assert!(sink.live_sources().is_empty());
    assert!(sink.audible_sources().is_empty());
}
