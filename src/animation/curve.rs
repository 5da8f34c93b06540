//! Frame-indexed curve primitives.
//!
//! Every function here is a pure function of its arguments. Time is always expressed as a frame
//! number, never wall-clock time, so the interactive preview and the offline renderer get
//! identical values for identical frames. Frames before a curve's start yield the start value.

use crate::animation::ease::Ease;
use crate::foundation::core::Vec2;

/// Frames per second used to turn elapsed frames into spring time.
///
/// This is a fixed constant rather than the host refresh rate: spring output depends on the
/// frame number only.
pub const SPRING_TIME_BASE: f64 = 30.0;

const MIN_SPRING_PARAM: f64 = 1e-3;

/// Linearly map `frame` from `[from_frame, to_frame]` onto `[from_value, to_value]`.
///
/// Frames before `from_frame` always yield `from_value`. With `clamp = false` frames after
/// `to_frame` extrapolate along the same slope. A degenerate window (`to_frame <= from_frame`)
/// is a step at `from_frame`.
pub fn linear(
    frame: u64,
    from_frame: u64,
    to_frame: u64,
    from_value: f64,
    to_value: f64,
    clamp: bool,
) -> f64 {
    if frame <= from_frame {
        return if frame == from_frame && to_frame <= from_frame {
            to_value
        } else {
            from_value
        };
    }
    if to_frame <= from_frame {
        return to_value;
    }

    let span = (to_frame - from_frame) as f64;
    let mut t = (frame - from_frame) as f64 / span;
    if clamp {
        t = t.min(1.0);
    }
    from_value + (to_value - from_value) * t
}

/// Critically damped approach from 0 to 1 starting at `start_frame`.
///
/// Uses `1 - e^(-wt) * (1 + wt)` with `w = damping / (2 * mass)` and
/// `t = elapsed_frames / SPRING_TIME_BASE`. The result is exactly `0` at or before
/// `start_frame`, monotonically non-decreasing afterwards and never exceeds `1`.
pub fn spring_approach(frame: u64, start_frame: u64, damping: f64, mass: f64) -> f64 {
    if frame <= start_frame {
        return 0.0;
    }
    let damping = sanitize_spring_param(damping);
    let mass = sanitize_spring_param(mass);

    let omega = damping / (2.0 * mass);
    let t = (frame - start_frame) as f64 / SPRING_TIME_BASE;
    let wt = omega * t;
    (1.0 - (-wt).exp() * (1.0 + wt)).clamp(0.0, 1.0)
}

fn sanitize_spring_param(v: f64) -> f64 {
    if v.is_finite() {
        v.max(MIN_SPRING_PARAM)
    } else {
        MIN_SPRING_PARAM
    }
}

/// Number of characters revealed by a typing animation at `frame`.
///
/// `floor(max(0, (frame - start_frame) * chars_per_frame))`, not clamped to any text length.
pub fn revealed_char_count(frame: u64, start_frame: u64, chars_per_frame: f64) -> usize {
    if frame <= start_frame || !chars_per_frame.is_finite() || chars_per_frame <= 0.0 {
        return 0;
    }
    let elapsed = (frame - start_frame) as f64;
    // Guard against products like 5 * 0.6 landing just under an integer.
    let chars = (elapsed * chars_per_frame + 1e-9).floor();
    if chars >= usize::MAX as f64 {
        usize::MAX
    } else {
        chars as usize
    }
}

/// Prefix of `full_text` revealed by a typing animation at `frame`.
///
/// Counts Unicode scalar values, so the returned slice always ends on a char boundary.
pub fn typed_reveal(frame: u64, start_frame: u64, chars_per_frame: f64, full_text: &str) -> &str {
    let count = revealed_char_count(frame, start_frame, chars_per_frame);
    if count == 0 {
        return "";
    }
    match full_text.char_indices().nth(count) {
        Some((byte_idx, _)) => &full_text[..byte_idx],
        None => full_text,
    }
}

/// Opacity fading from 0 to 1 over `duration_frames` starting at `start_frame`.
pub fn fade_opacity(frame: u64, start_frame: u64, duration_frames: u64, ease: Ease) -> f64 {
    let t = linear(
        frame,
        start_frame,
        start_frame.saturating_add(duration_frames),
        0.0,
        1.0,
        true,
    );
    ease.apply(t)
}

/// Scale springing from `from_scale` to `1.0`.
pub fn scale_from_spring(
    frame: u64,
    start_frame: u64,
    from_scale: f64,
    damping: f64,
    mass: f64,
) -> f64 {
    let p = spring_approach(frame, start_frame, damping, mass);
    from_scale + (1.0 - from_scale) * p
}

/// Offset springing from `from_offset` to zero.
pub fn translate_from_spring(
    frame: u64,
    start_frame: u64,
    from_offset: Vec2,
    damping: f64,
    mass: f64,
) -> Vec2 {
    let p = spring_approach(frame, start_frame, damping, mass);
    from_offset * (1.0 - p)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
