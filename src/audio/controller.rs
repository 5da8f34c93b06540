use crate::{
    audio::sink::{AudioError, AudioEvent, AudioEventKind, AudioSink, SourceId},
    composition::model::AudioPlan,
    foundation::core::{Fps, FrameIndex},
};

const GAIN_EPSILON: f32 = 1e-4;

/// Snapshot of the audio channel for the presentation layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioState {
    /// Catalog id of the acquired track.
    pub active_track: Option<String>,
    /// Last gain sent to the sink, in `[0, 1]`.
    pub gain: f32,
    /// Media position matching the last synced frame, in seconds.
    pub position_sec: f64,
}

/// Something the host UI should hear about.
#[derive(Clone, Debug, PartialEq)]
pub enum AudioNotice {
    /// An audio operation failed; the session continues muted.
    Failed(AudioError),
    /// Playback started after an earlier failure.
    Recovered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceStatus {
    Ready,
    Starting,
    Playing,
    Paused,
    Ended,
}

#[derive(Clone, Debug)]
struct ActiveSource {
    id: SourceId,
    track_id: String,
    status: SourceStatus,
}

/// Owns zero or one audio source and keeps it aligned with the visual frame index.
///
/// All sink failures stop here: they set the muted flag and queue an [`AudioNotice`], and no
/// method returns an error to the frame loop. Track switches run stop, release, acquire, start
/// in that order, so two sources are never audible together.
pub struct AudioSyncController<S: AudioSink> {
    sink: S,
    plan: Option<AudioPlan>,
    fps: Fps,
    speed: f64,
    enabled: bool,
    playing: bool,
    active: Option<ActiveSource>,
    muted: Option<AudioError>,
    gain: f32,
    last_frame: FrameIndex,
    position_sec: f64,
    resync_tolerance_sec: f64,
    notices: Vec<AudioNotice>,
}

impl<S: AudioSink> AudioSyncController<S> {
    /// New controller, disabled and paused. Nothing touches the sink until audio is enabled.
    pub fn new(sink: S, plan: Option<AudioPlan>, fps: Fps, speed: f64) -> Self {
        let position_sec = plan.as_ref().map_or(0.0, |p| p.start_sec);
        Self {
            sink,
            plan,
            fps,
            speed,
            enabled: false,
            playing: false,
            active: None,
            muted: None,
            gain: 0.0,
            last_frame: FrameIndex(0),
            position_sec,
            resync_tolerance_sec: 0.25,
            notices: Vec::new(),
        }
    }

    /// Frame jumps longer than this (in timeline seconds) trigger a re-seek.
    pub fn with_resync_tolerance(mut self, secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            self.resync_tolerance_sec = secs;
        }
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn plan(&self) -> Option<&AudioPlan> {
        self.plan.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` after a failure, until a later start succeeds.
    pub fn is_muted(&self) -> bool {
        self.muted.is_some()
    }

    /// `true` while a source is playing or a start request is pending.
    pub fn is_audible(&self) -> bool {
        matches!(
            self.active.as_ref().map(|a| a.status),
            Some(SourceStatus::Playing | SourceStatus::Starting)
        )
    }

    pub fn state(&self) -> AudioState {
        AudioState {
            active_track: self.active.as_ref().map(|a| a.track_id.clone()),
            gain: self.gain,
            position_sec: self.position_sec,
        }
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<AudioNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Switch to `plan`'s track, or to silence with `None`.
    ///
    /// Same track: volume, fades and start offset update in place and apply immediately.
    /// Different track: the old source is stopped and released before the new one is acquired.
    pub fn set_plan(&mut self, plan: Option<AudioPlan>, frame: FrameIndex) {
        let same_track = match (&self.plan, &plan) {
            (Some(a), Some(b)) => a.track.id == b.track.id,
            (None, None) => true,
            _ => false,
        };
        let start_moved = match (&self.plan, &plan) {
            (Some(a), Some(b)) => a.start_sec != b.start_sec,
            _ => false,
        };
        self.plan = plan;

        if same_track {
            if start_moved {
                self.seek_to_frame(frame);
            }
            self.apply_gain(frame, true);
            return;
        }

        tracing::debug!(
            track = self.plan.as_ref().map(|p| p.track.id.as_str()),
            "switching background track"
        );
        self.release_active();
        self.muted = None;
        self.last_frame = frame;
        if self.enabled {
            self.ensure_source(frame);
            if self.playing {
                self.start(frame);
            }
        }
    }

    /// Change the playback rate to follow the visual speed factor.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        if let Some(a) = &self.active {
            self.sink.set_rate(a.id, speed);
        }
    }

    /// Opt in to (or out of) audio. Enabling while playing starts at the offset of `frame`,
    /// not at the track start, and retries after an earlier failure.
    pub fn set_enabled(&mut self, enabled: bool, frame: FrameIndex) {
        if enabled == self.enabled && !(enabled && self.muted.is_some()) {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.muted = None;
            self.ensure_source(frame);
            if self.playing {
                self.start(frame);
            }
        } else {
            self.pause_active();
        }
    }

    /// Mirror of the clock's `play`.
    pub fn play(&mut self, frame: FrameIndex) {
        self.playing = true;
        if self.enabled {
            self.ensure_source(frame);
            self.start(frame);
        }
    }

    /// Mirror of the clock's `pause`.
    pub fn pause(&mut self) {
        self.playing = false;
        self.pause_active();
    }

    /// Mirror of the clock's `restart`; also used on loop wrap so the fade-in repeats.
    ///
    /// Seeks to the configured start offset before resuming.
    pub fn restart(&mut self) {
        self.playing = true;
        if !self.enabled {
            self.seek_to_frame(FrameIndex(0));
            return;
        }
        self.ensure_source(FrameIndex(0));
        self.start(FrameIndex(0));
    }

    /// Jump to `frame` (scrub) keeping the current play state.
    pub fn seek(&mut self, frame: FrameIndex) {
        self.seek_to_frame(frame);
        self.apply_gain(frame, true);
    }

    /// Per-frame sync: update gain along the envelope and re-seek after discontinuities.
    pub fn on_frame(&mut self, frame: FrameIndex, wrapped: bool) {
        if wrapped {
            self.restart();
            // The wrap may land a few frames past 0; line the audio up with it.
            if frame.0 > 0 {
                self.seek(frame);
            }
            self.last_frame = frame;
            return;
        }

        let jump = frame.0.abs_diff(self.last_frame.0);
        let jumped_back = frame.0 < self.last_frame.0;
        if jumped_back || self.fps.frames_to_secs(jump) > self.resync_tolerance_sec {
            self.seek_to_frame(frame);
        } else {
            self.position_sec = self.media_position(frame);
            self.last_frame = frame;
        }
        self.apply_gain(frame, false);
    }

    /// Feed an asynchronous outcome from the host. Events for released sources are ignored.
    pub fn handle_event(&mut self, event: AudioEvent) {
        let Some(active) = self.active.as_mut() else {
            tracing::trace!(source = event.source.0, "audio event with no active source");
            return;
        };
        if active.id != event.source {
            tracing::trace!(source = event.source.0, "stale audio event ignored");
            return;
        }

        match event.kind {
            AudioEventKind::Started => {
                if active.status == SourceStatus::Starting {
                    active.status = SourceStatus::Playing;
                }
                if self.muted.take().is_some() {
                    self.notices.push(AudioNotice::Recovered);
                }
            }
            AudioEventKind::Rejected(reason) => {
                active.status = SourceStatus::Paused;
                self.fail(AudioError::PlaybackRejected(reason));
            }
            AudioEventKind::Failed(reason) => {
                let track = active.track_id.clone();
                self.release_active();
                self.fail(AudioError::ResourceLoad { track, reason });
            }
            AudioEventKind::Ended => {
                active.status = SourceStatus::Ended;
            }
        }
    }

    /// Stop and release everything. Idempotent.
    pub fn shutdown(&mut self) {
        self.playing = false;
        self.release_active();
    }

    fn media_position(&self, frame: FrameIndex) -> f64 {
        let t = self.fps.frames_to_secs(frame.0);
        self.plan.as_ref().map_or(0.0, |p| p.media_position(t))
    }

    fn ensure_source(&mut self, frame: FrameIndex) {
        // A muted controller only retries through `set_enabled` or a track change.
        if self.active.is_some() || self.muted.is_some() {
            return;
        }
        let Some(plan) = &self.plan else {
            return;
        };
        match self.sink.acquire(&plan.track) {
            Ok(id) => {
                tracing::debug!(source = id.0, track = %plan.track.id, "audio source acquired");
                self.active = Some(ActiveSource {
                    id,
                    track_id: plan.track.id.clone(),
                    status: SourceStatus::Ready,
                });
                self.sink.set_rate(id, self.speed);
                self.seek_to_frame(frame);
                self.apply_gain(frame, true);
            }
            Err(e) => self.fail(e),
        }
    }

    fn start(&mut self, frame: FrameIndex) {
        if self.muted.is_some() {
            return;
        }
        let Some(id) = self.active.as_ref().map(|a| a.id) else {
            return;
        };
        self.seek_to_frame(frame);
        self.apply_gain(frame, true);
        match self.sink.start(id) {
            Ok(()) => {
                if let Some(a) = self.active.as_mut() {
                    a.status = SourceStatus::Starting;
                }
            }
            Err(e) => {
                if let Some(a) = self.active.as_mut() {
                    a.status = SourceStatus::Paused;
                }
                self.fail(e);
            }
        }
    }

    fn seek_to_frame(&mut self, frame: FrameIndex) {
        self.position_sec = self.media_position(frame);
        self.last_frame = frame;
        if let Some(a) = &self.active {
            self.sink.seek(a.id, self.position_sec);
        }
    }

    fn apply_gain(&mut self, frame: FrameIndex, force: bool) {
        let gain = self.plan.as_ref().map_or(0.0, |p| {
            p.envelope
                .gain_at(self.fps.frames_to_secs(frame.0), p.gain)
        });
        let Some(a) = &self.active else {
            self.gain = gain;
            return;
        };
        if force || (gain - self.gain).abs() > GAIN_EPSILON {
            self.sink.set_gain(a.id, gain);
            self.gain = gain;
        }
    }

    fn pause_active(&mut self) {
        if let Some(a) = self.active.as_mut()
            && matches!(a.status, SourceStatus::Starting | SourceStatus::Playing)
        {
            self.sink.pause(a.id);
            a.status = SourceStatus::Paused;
        }
    }

    fn release_active(&mut self) {
        if let Some(a) = self.active.take() {
            self.sink.stop(a.id);
            self.sink.release(a.id);
            tracing::debug!(source = a.id.0, track = %a.track_id, "audio source released");
        }
        self.gain = 0.0;
    }

    fn fail(&mut self, err: AudioError) {
        tracing::warn!(error = %err, "audio muted");
        self.muted = Some(err.clone());
        self.notices.push(AudioNotice::Failed(err));
    }
}

impl<S: AudioSink> Drop for AudioSyncController<S> {
    fn drop(&mut self) {
        self.release_active();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/controller.rs"]
mod tests;
