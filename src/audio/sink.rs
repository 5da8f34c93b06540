//! Host audio device boundary.
//!
//! The host (browser media element, native mixer, test double) implements [`AudioSink`]. Calls
//! return immediately: anything that completes later (a start request being accepted or
//! rejected by an autoplay policy, a decode failure, the track ending) comes back as an
//! [`AudioEvent`] that the host feeds to the controller.

use crate::settings::catalog::TrackInfo;

/// Opaque handle to one acquired audio source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Failures reported by the audio boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// The track resource could not be loaded or decoded.
    #[error("failed to load '{track}': {reason}")]
    ResourceLoad {
        /// Catalog id of the track.
        track: String,
        /// Host-provided reason.
        reason: String,
    },

    /// The host refused to start playback (e.g. autoplay policy).
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// `backgroundMusic` names a track missing from the catalog.
    #[error("unknown track '{0}'")]
    UnknownTrack(String),
}

/// Asynchronous outcome delivered by the host after a sink call returned.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioEvent {
    /// Source the event refers to.
    pub source: SourceId,
    /// What happened.
    pub kind: AudioEventKind,
}

/// Kind of asynchronous audio outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum AudioEventKind {
    /// A pending start request is now audible.
    Started,
    /// A pending start request was refused.
    Rejected(String),
    /// The source failed after acquisition (network, decode).
    Failed(String),
    /// The source reached the end of its media.
    Ended,
}

/// Host audio device.
///
/// Implementations must not block. `start` only *requests* playback; success or refusal may be
/// reported synchronously through the `Err` return or later through an [`AudioEvent`].
pub trait AudioSink {
    /// Acquire a source for `track`, positioned at the media start, paused, gain 0.
    fn acquire(&mut self, track: &TrackInfo) -> Result<SourceId, AudioError>;

    /// Request playback from the current position.
    fn start(&mut self, source: SourceId) -> Result<(), AudioError>;

    /// Pause without releasing.
    fn pause(&mut self, source: SourceId);

    /// Move the playhead to `position_sec` in media time.
    fn seek(&mut self, source: SourceId, position_sec: f64);

    /// Set linear output gain in `[0, 1]`.
    fn set_gain(&mut self, source: SourceId, gain: f32);

    /// Set playback rate (1.0 = normal).
    fn set_rate(&mut self, source: SourceId, rate: f64);

    /// Stop playback. The source stays acquired until [`AudioSink::release`].
    fn stop(&mut self, source: SourceId);

    /// Release every resource held by `source`. The id is dead afterwards.
    fn release(&mut self, source: SourceId);
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn acquire(&mut self, track: &TrackInfo) -> Result<SourceId, AudioError> {
        (**self).acquire(track)
    }

    fn start(&mut self, source: SourceId) -> Result<(), AudioError> {
        (**self).start(source)
    }

    fn pause(&mut self, source: SourceId) {
        (**self).pause(source)
    }

    fn seek(&mut self, source: SourceId, position_sec: f64) {
        (**self).seek(source, position_sec)
    }

    fn set_gain(&mut self, source: SourceId, gain: f32) {
        (**self).set_gain(source, gain)
    }

    fn set_rate(&mut self, source: SourceId, rate: f64) {
        (**self).set_rate(source, rate)
    }

    fn stop(&mut self, source: SourceId) {
        (**self).stop(source)
    }

    fn release(&mut self, source: SourceId) {
        (**self).release(source)
    }
}

/// Sink that accepts every call and logs it.
///
/// Used by the CLI preview simulation and anywhere a session runs without an audio device.
#[derive(Debug, Default)]
pub struct TracingAudioSink {
    next_id: u64,
}

impl AudioSink for TracingAudioSink {
    fn acquire(&mut self, track: &TrackInfo) -> Result<SourceId, AudioError> {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        tracing::debug!(source = id.0, track = %track.id, path = %track.path, "audio acquire");
        Ok(id)
    }

    fn start(&mut self, source: SourceId) -> Result<(), AudioError> {
        tracing::debug!(source = source.0, "audio start");
        Ok(())
    }

    fn pause(&mut self, source: SourceId) {
        tracing::debug!(source = source.0, "audio pause");
    }

    fn seek(&mut self, source: SourceId, position_sec: f64) {
        tracing::debug!(source = source.0, position_sec, "audio seek");
    }

    fn set_gain(&mut self, source: SourceId, gain: f32) {
        tracing::trace!(source = source.0, gain, "audio gain");
    }

    fn set_rate(&mut self, source: SourceId, rate: f64) {
        tracing::debug!(source = source.0, rate, "audio rate");
    }

    fn stop(&mut self, source: SourceId) {
        tracing::debug!(source = source.0, "audio stop");
    }

    fn release(&mut self, source: SourceId) {
        tracing::debug!(source = source.0, "audio release");
    }
}

/// One call recorded by [`InMemoryAudioSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkOp {
    Acquire { source: SourceId, track: String },
    Start(SourceId),
    Pause(SourceId),
    Seek(SourceId, f64),
    Gain(SourceId, f32),
    Rate(SourceId, f64),
    Stop(SourceId),
    Release(SourceId),
}

/// In-memory sink for tests and debugging.
///
/// Records every call, tracks which sources are live and audible, and can be told to fail the
/// next acquire or start.
#[derive(Debug, Default)]
pub struct InMemoryAudioSink {
    ops: Vec<SinkOp>,
    next_id: u64,
    live: std::collections::BTreeSet<SourceId>,
    audible: std::collections::BTreeSet<SourceId>,
    max_audible: usize,
    fail_acquire: Option<AudioError>,
    reject_start: Option<AudioError>,
}

impl InMemoryAudioSink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the recorded calls.
    pub fn ops(&self) -> &[SinkOp] {
        &self.ops
    }

    /// Forget recorded calls (live/audible bookkeeping is kept).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Sources acquired and not yet released.
    pub fn live_sources(&self) -> Vec<SourceId> {
        self.live.iter().copied().collect()
    }

    /// Sources started and not paused, stopped or released since.
    pub fn audible_sources(&self) -> Vec<SourceId> {
        self.audible.iter().copied().collect()
    }

    /// Highest number of simultaneously audible sources ever observed.
    pub fn max_audible(&self) -> usize {
        self.max_audible
    }

    /// Make the next `acquire` fail with `err`.
    pub fn fail_next_acquire(&mut self, err: AudioError) {
        self.fail_acquire = Some(err);
    }

    /// Make the next `start` fail with `err`.
    pub fn reject_next_start(&mut self, err: AudioError) {
        self.reject_start = Some(err);
    }

    /// Last gain sent to `source`.
    pub fn last_gain(&self, source: SourceId) -> Option<f32> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Gain(s, g) if *s == source => Some(*g),
            _ => None,
        })
    }

    /// Last seek position sent to `source`.
    pub fn last_seek(&self, source: SourceId) -> Option<f64> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::Seek(s, p) if *s == source => Some(*p),
            _ => None,
        })
    }
}

impl AudioSink for InMemoryAudioSink {
    fn acquire(&mut self, track: &TrackInfo) -> Result<SourceId, AudioError> {
        if let Some(err) = self.fail_acquire.take() {
            return Err(err);
        }
        self.next_id += 1;
        let source = SourceId(self.next_id);
        self.live.insert(source);
        self.ops.push(SinkOp::Acquire {
            source,
            track: track.id.clone(),
        });
        Ok(source)
    }

    fn start(&mut self, source: SourceId) -> Result<(), AudioError> {
        self.ops.push(SinkOp::Start(source));
        if let Some(err) = self.reject_start.take() {
            return Err(err);
        }
        if self.live.contains(&source) {
            self.audible.insert(source);
            self.max_audible = self.max_audible.max(self.audible.len());
        }
        Ok(())
    }

    fn pause(&mut self, source: SourceId) {
        self.ops.push(SinkOp::Pause(source));
        self.audible.remove(&source);
    }

    fn seek(&mut self, source: SourceId, position_sec: f64) {
        self.ops.push(SinkOp::Seek(source, position_sec));
    }

    fn set_gain(&mut self, source: SourceId, gain: f32) {
        self.ops.push(SinkOp::Gain(source, gain));
    }

    fn set_rate(&mut self, source: SourceId, rate: f64) {
        self.ops.push(SinkOp::Rate(source, rate));
    }

    fn stop(&mut self, source: SourceId) {
        self.ops.push(SinkOp::Stop(source));
        self.audible.remove(&source);
    }

    fn release(&mut self, source: SourceId) {
        self.ops.push(SinkOp::Release(source));
        self.audible.remove(&source);
        self.live.remove(&source);
    }
}
