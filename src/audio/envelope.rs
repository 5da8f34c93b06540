use crate::foundation::core::Fps;

/// Gain ramp applied to the background track, in timeline seconds.
///
/// Timeline second `0` is the start of playback (frame 0). The envelope is a multiplier in
/// `[0, 1]`; the caller scales it by the volume target, so a volume change never resets ramp
/// progress.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeEnvelope {
    /// Fade-in length in seconds, `0` for none.
    pub fade_in_sec: f64,
    /// Fade-out length in seconds, `0` for none.
    pub fade_out_sec: f64,
    /// Timeline second where audible audio ends: the earlier of track end and video end.
    pub end_sec: f64,
}

impl FadeEnvelope {
    /// Envelope level at timeline second `t`.
    pub fn level_at(&self, t: f64) -> f32 {
        if !t.is_finite() {
            return 0.0;
        }
        let t = t.max(0.0);
        if t >= self.end_sec {
            return 0.0;
        }

        let mut level = 1.0f64;
        if self.fade_in_sec > 0.0 {
            level *= (t / self.fade_in_sec).clamp(0.0, 1.0);
        }
        if self.fade_out_sec > 0.0 {
            let rem = (self.end_sec - t).max(0.0);
            level *= (rem / self.fade_out_sec).clamp(0.0, 1.0);
        }
        level as f32
    }

    /// Output gain at timeline second `t` for a volume `target` in `[0, 1]`.
    pub fn gain_at(&self, t: f64, target: f32) -> f32 {
        (self.level_at(t) * target.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    }

    /// Output gain at a timeline frame.
    pub fn gain_at_frame(&self, frame: u64, fps: Fps, target: f32) -> f32 {
        self.gain_at(fps.frames_to_secs(frame), target)
    }

    /// Second at which the fade-out begins, if there is one.
    pub fn fade_out_start_sec(&self) -> Option<f64> {
        (self.fade_out_sec > 0.0).then(|| (self.end_sec - self.fade_out_sec).max(0.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/envelope.rs"]
mod tests;
