//! quotereel animates short testimonial ads from a plain settings record.
//!
//! One pure evaluator maps a frame index to the visual state of every element. The interactive
//! preview and the offline renderer both drive it, so a frame looks the same wherever it is
//! produced:
//!
//! - Derive a [`Composition`] from [`Settings`]
//! - Preview it with a [`PreviewPlayer`] (clock, audio sync, frame scheduling)
//! - Hand it off as a [`RenderJob`] with per-frame fingerprints
#![forbid(unsafe_code)]

pub mod animation;
pub mod audio;
pub mod composition;
pub mod eval;
pub mod foundation;
pub mod render;
pub mod session;
pub mod settings;
pub mod timeline;

pub use crate::foundation::core::{
    COMPOSITION_FPS, Fps, FrameIndex, FrameRange, Transform2D, Vec2,
};
pub use crate::foundation::error::{QuoteReelError, QuoteReelResult};

pub use crate::audio::controller::{AudioNotice, AudioState, AudioSyncController};
pub use crate::audio::envelope::FadeEnvelope;
pub use crate::audio::sink::{
    AudioError, AudioEvent, AudioEventKind, AudioSink, InMemoryAudioSink, SinkOp, SourceId,
    TracingAudioSink,
};
pub use crate::composition::model::{AudioPlan, Composition, TimingAdjustment};
pub use crate::eval::evaluator::{ElementState, Evaluator, VisualState};
pub use crate::render::fingerprint::{FrameFingerprint, fingerprint_state};
pub use crate::render::job::{AudioCue, RenderJob};
pub use crate::render::offline::{OfflineOpts, OfflineRenderer};
pub use crate::session::preview::{PlaybackState, PlayerNotice, PreviewOpts, PreviewPlayer};
pub use crate::session::scheduler::{FrameRequestId, FrameScheduler, ManualFrameScheduler};
pub use crate::settings::model::{AnimationSpeed, Settings};
pub use crate::timeline::clock::{ClockState, ClockTick, TimelineClock};
