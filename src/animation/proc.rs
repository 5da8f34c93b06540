use std::f64::consts::TAU;

/// Periodic procedural motion driven by the frame number.
///
/// Infinite and restartable: the value at a frame depends on nothing but the frame, so a loop
/// wrap or restart needs no state reset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Periodic {
    /// Peak deviation from `offset`.
    pub amp: f64,
    /// Period length in frames (`> 0`).
    pub period_frames: f64,
    /// Phase in radians.
    pub phase: f64,
    /// Center value.
    pub offset: f64,
}

impl Periodic {
    /// Sine wave `offset + amp * sin(TAU * frame / period + phase)`.
    pub fn sine(amp: f64, period_frames: f64, phase: f64) -> Self {
        Self {
            amp,
            period_frames,
            phase,
            offset: 0.0,
        }
    }

    /// Sample at an absolute frame. A non-positive or non-finite period yields `offset`.
    pub fn sample(&self, frame: u64) -> f64 {
        if !self.period_frames.is_finite() || self.period_frames <= 0.0 {
            return self.offset;
        }
        let cycles = (frame as f64) / self.period_frames;
        self.offset + self.amp * (TAU * cycles + self.phase).sin()
    }
}
