use std::time::Duration;

use crate::{
    audio::{
        controller::{AudioNotice, AudioState, AudioSyncController},
        sink::{AudioError, AudioEvent, AudioSink},
    },
    composition::model::{Composition, TimingAdjustment},
    eval::evaluator::{Evaluator, VisualState},
    foundation::core::FrameIndex,
    session::scheduler::{FrameRequestId, FrameScheduler},
    settings::{catalog, model::Settings},
    timeline::clock::TimelineClock,
};

/// Options controlling a [`PreviewPlayer`] session.
#[derive(Clone, Debug)]
pub struct PreviewOpts {
    /// Start with audio enabled. Audio is an explicit opt-in, independent of play/pause.
    pub audio_enabled: bool,
    /// Wrap to frame 0 after the last frame instead of stopping there.
    pub looping: bool,
    /// Frame jumps longer than this (seconds) re-seek the audio source.
    pub resync_tolerance_sec: f64,
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self {
            audio_enabled: false,
            looping: true,
            resync_tolerance_sec: 0.25,
        }
    }
}

/// Snapshot of the playback state for the host UI.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackState {
    pub current_frame: FrameIndex,
    pub is_playing: bool,
    pub speed_factor: f64,
    pub audio_enabled: bool,
    /// Loop wraps since the last restart.
    pub loop_count: u64,
    /// Audio is enabled but silenced by an earlier failure.
    pub audio_muted: bool,
}

/// Non-fatal events the host should surface (toast, status line, log).
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerNotice {
    AudioFailed(AudioError),
    AudioRecovered,
    /// A settings value was out of range and got clamped.
    TimingAdjusted(TimingAdjustment),
    /// An image failed to load; the element renders without it.
    AssetUnavailable { key: String, reason: String },
}

impl From<AudioNotice> for PlayerNotice {
    fn from(n: AudioNotice) -> Self {
        match n {
            AudioNotice::Failed(e) => Self::AudioFailed(e),
            AudioNotice::Recovered => Self::AudioRecovered,
        }
    }
}

/// Interactive preview session.
///
/// Owns the composition, the clock, the audio controller and at most one pending frame
/// request. The host calls [`PreviewPlayer::on_frame`] whenever a requested frame fires and
/// renders the returned [`VisualState`]. Audio failures never reach the frame path: they show up
/// as [`PlayerNotice`]s.
///
/// Teardown (explicit [`PreviewPlayer::shutdown`] or drop) cancels the pending frame request and
/// stops and releases the audio source.
pub struct PreviewPlayer<S: AudioSink, F: FrameScheduler> {
    composition: Composition,
    speed: f64,
    clock: TimelineClock,
    audio: AudioSyncController<S>,
    scheduler: F,
    pending: Option<FrameRequestId>,
    audio_enabled: bool,
    notices: Vec<PlayerNotice>,
    shut_down: bool,
}

impl<S: AudioSink, F: FrameScheduler> PreviewPlayer<S, F> {
    /// Start a session at frame 0, playing.
    #[tracing::instrument(skip_all, fields(audio = opts.audio_enabled, looping = opts.looping))]
    pub fn new(settings: &Settings, sink: S, scheduler: F, opts: PreviewOpts) -> Self {
        let composition = Composition::from_settings(settings);
        let speed = settings.animation_speed.speed_factor();
        let clock = TimelineClock::new(composition.fps, composition.total_frames(), speed)
            .with_looping(opts.looping);
        let audio = AudioSyncController::new(sink, composition.audio.clone(), composition.fps, speed)
            .with_resync_tolerance(opts.resync_tolerance_sec);

        let mut player = Self {
            composition,
            speed,
            clock,
            audio,
            scheduler,
            pending: None,
            audio_enabled: false,
            notices: Vec::new(),
            shut_down: false,
        };
        player.note_settings(settings);
        if opts.audio_enabled {
            player.toggle_audio(true);
        }
        tracing::info!(
            frames = player.composition.total_frames(),
            speed,
            "preview session started"
        );
        player.play();
        player
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn audio_sink(&self) -> &S {
        self.audio.sink()
    }

    pub fn audio_sink_mut(&mut self) -> &mut S {
        self.audio.sink_mut()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio.state()
    }

    /// Frame request currently outstanding, if any.
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_frame: self.clock.current_frame(),
            is_playing: self.clock.is_playing(),
            speed_factor: self.speed,
            audio_enabled: self.audio_enabled,
            loop_count: self.clock.loop_count(),
            audio_muted: self.audio_enabled && self.audio.is_muted(),
        }
    }

    /// Visual state of the current frame.
    pub fn visual_state(&self) -> VisualState {
        Evaluator::evaluate(&self.composition, self.clock.current_frame())
    }

    /// Resume from the frozen frame.
    pub fn play(&mut self) {
        if self.shut_down {
            return;
        }
        self.clock.play();
        self.audio.play(self.clock.current_frame());
        self.request_frame();
        self.pump_audio_notices();
    }

    /// Freeze on the current frame. Cancels the pending frame request.
    pub fn pause(&mut self) {
        self.clock.pause();
        self.audio.pause();
        self.cancel_frame();
    }

    /// Play from frame 0 with the audio back at its start offset, from any state.
    pub fn restart(&mut self) {
        if self.shut_down {
            return;
        }
        self.clock.restart();
        self.audio.restart();
        self.request_frame();
        self.pump_audio_notices();
        tracing::debug!("preview restarted");
    }

    /// Opt in to or out of audio. Enabling mid-playback joins at the current frame offset;
    /// enabling after a failure retries.
    pub fn toggle_audio(&mut self, enabled: bool) {
        if self.shut_down {
            return;
        }
        self.audio_enabled = enabled;
        self.audio.set_enabled(enabled, self.clock.current_frame());
        self.pump_audio_notices();
    }

    /// Jump to `frame` (clamped) keeping the play state.
    pub fn scrub(&mut self, frame: FrameIndex) {
        let frame = self.composition.clamp_frame(frame);
        self.clock.seek(frame);
        self.audio.seek(frame);
        self.pump_audio_notices();
    }

    /// Host frame callback: advance the clock to presentation time `now` and return the state
    /// to present.
    ///
    /// Returns `None` when the session is not playing. While playing, exactly one follow-up
    /// frame is requested.
    pub fn on_frame(&mut self, now: Duration) -> Option<VisualState> {
        self.pending = None;
        if self.shut_down {
            return None;
        }
        let tick = self.clock.tick(now)?;
        if tick.wrapped {
            tracing::debug!(loops = self.clock.loop_count(), "preview looped");
        }
        self.audio.on_frame(tick.frame, tick.wrapped);
        if tick.ended {
            self.audio.pause();
        } else {
            self.request_frame();
        }
        self.pump_audio_notices();
        Some(Evaluator::evaluate(&self.composition, tick.frame))
    }

    /// Feed an asynchronous audio outcome from the host.
    pub fn handle_audio_event(&mut self, event: AudioEvent) {
        self.audio.handle_event(event);
        self.pump_audio_notices();
    }

    /// Drop an image that failed to load; its element keeps animating without it.
    pub fn report_asset_failure(&mut self, key: &str, reason: &str) {
        if !self.composition.assets.contains_key(key) {
            return;
        }
        tracing::warn!(asset = key, reason, "image unavailable, rendering without it");
        self.composition = self.composition.without_asset(key);
        self.notices.push(PlayerNotice::AssetUnavailable {
            key: key.to_owned(),
            reason: reason.to_owned(),
        });
    }

    /// Rebind the composition to an edited settings record.
    ///
    /// Playback state and frame position are kept (clamped to the new length). Volume, fade and
    /// start offset changes apply immediately; a different track replaces the old source.
    pub fn update_settings(&mut self, settings: &Settings) {
        if self.shut_down {
            return;
        }
        self.composition = Composition::from_settings(settings);
        self.clock.set_total_frames(self.composition.total_frames());

        let speed = settings.animation_speed.speed_factor();
        if speed != self.speed {
            self.speed = speed;
            self.clock.set_speed(speed);
            self.audio.set_speed(speed);
        }
        self.audio
            .set_plan(self.composition.audio.clone(), self.clock.current_frame());
        self.note_settings(settings);
        self.pump_audio_notices();
    }

    /// Take all notices queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<PlayerNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Cancel the pending frame and release audio. Idempotent; the session is inert afterwards.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.clock.pause();
        self.cancel_frame();
        self.audio.shutdown();
        self.shut_down = true;
        tracing::debug!("preview session shut down");
    }

    fn request_frame(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    fn pump_audio_notices(&mut self) {
        self.notices
            .extend(self.audio.take_notices().into_iter().map(PlayerNotice::from));
    }

    fn note_settings(&mut self, settings: &Settings) {
        self.notices.extend(
            self.composition
                .adjustments
                .iter()
                .cloned()
                .map(PlayerNotice::TimingAdjusted),
        );
        if let Err(e) = catalog::resolve(&settings.background_music) {
            self.notices.push(PlayerNotice::AudioFailed(e));
        }
    }
}

impl<S: AudioSink, F: FrameScheduler> Drop for PreviewPlayer<S, F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
