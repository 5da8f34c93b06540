use crate::foundation::error::{QuoteReelError, QuoteReelResult};

pub use kurbo::{Affine, Vec2};

/// Absolute 0-based frame index in composition timeline space.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> QuoteReelResult<Self> {
        if start.0 > end.0 {
            return Err(QuoteReelError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Clamp a frame index into this range.
    ///
    /// Empty ranges clamp to `start`.
    pub fn clamp(self, f: FrameIndex) -> FrameIndex {
        if self.is_empty() {
            return self.start;
        }
        let max_inclusive = self.end.0.saturating_sub(1);
        FrameIndex(f.0.clamp(self.start.0, max_inclusive))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

/// Frame rate shared by every composition.
pub const COMPOSITION_FPS: Fps = Fps { num: 30, den: 1 };

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> QuoteReelResult<Self> {
        if den == 0 {
            return Err(QuoteReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(QuoteReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        if !secs.is_finite() {
            return 0;
        }
        // Nudge before flooring so 5.0 s * 30 never lands on 149.999...
        (secs * self.as_f64() + 1e-9).floor().max(0.0) as u64
    }

    /// Convert seconds to frame count rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        if !secs.is_finite() {
            return 0;
        }
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// 2D transform of one composition element.
///
/// Translation is in output pixels, relative to the element's layout position (owned by the
/// presentation layer). Scale is uniform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Offset from the element's resting position.
    pub translate: Vec2,
    /// Uniform scale, `1.0` at rest.
    pub scale: f64,
    /// Rotation in degrees, clockwise.
    pub rotation_deg: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl Transform2D {
    /// Convert to an affine matrix around the element origin.
    ///
    /// Canonical order: `T(translate) * R(rotation) * S(scale)`.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.translate)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
