use std::time::Duration;

use crate::foundation::core::{Fps, FrameIndex};

/// Playback state of a [`TimelineClock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ClockState {
    /// Never started; frame 0.
    Idle,
    /// Advancing on every tick.
    Playing,
    /// Frozen at the current frame.
    Paused,
}

/// Result of one clock tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTick {
    /// Frame shown after this tick.
    pub frame: FrameIndex,
    /// Frame shown before this tick.
    pub previous: FrameIndex,
    /// The timeline passed its last frame and wrapped to the start.
    pub wrapped: bool,
    /// The timeline reached its last frame with looping disabled and paused there.
    pub ended: bool,
}

/// Converts host presentation timestamps into a frame index.
///
/// Playback progress is kept as fractional frames: a `banked` amount accumulated before the
/// current run, plus `(now - run_origin) * fps * speed` for the current run. Pausing banks the
/// position reached at the last tick and drops the origin, so wall time spent paused never
/// counts as progress. The origin of a new run is captured on its first tick.
#[derive(Clone, Debug)]
pub struct TimelineClock {
    fps: Fps,
    total_frames: u64,
    speed: f64,
    looping: bool,
    state: ClockState,
    banked: f64,
    run_origin: Option<Duration>,
    position: f64,
    current: FrameIndex,
    loops: u64,
}

impl TimelineClock {
    /// Idle clock at frame 0. `total_frames` is clamped to at least 1.
    pub fn new(fps: Fps, total_frames: u64, speed: f64) -> Self {
        Self {
            fps,
            total_frames: total_frames.max(1),
            speed: sanitize_speed(speed),
            looping: true,
            state: ClockState::Idle,
            banked: 0.0,
            run_origin: None,
            position: 0.0,
            current: FrameIndex(0),
            loops: 0,
        }
    }

    /// Enable or disable wrap-around at the end of the timeline (enabled by default).
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.current
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Number of loop wraps since the last restart.
    pub fn loop_count(&self) -> u64 {
        self.loops
    }

    /// Start or resume from the frozen frame. No-op while playing.
    pub fn play(&mut self) {
        if self.state == ClockState::Playing {
            return;
        }
        self.banked = self.position;
        self.run_origin = None;
        self.state = ClockState::Playing;
    }

    /// Freeze at the frame shown by the last tick. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != ClockState::Playing {
            return;
        }
        self.banked = self.position;
        self.run_origin = None;
        self.state = ClockState::Paused;
    }

    /// Back to frame 0 and playing, from any state. Discards banked progress.
    pub fn restart(&mut self) {
        self.banked = 0.0;
        self.position = 0.0;
        self.run_origin = None;
        self.current = FrameIndex(0);
        self.loops = 0;
        self.state = ClockState::Playing;
    }

    /// Jump to `frame` (clamped) without changing play/pause state.
    pub fn seek(&mut self, frame: FrameIndex) {
        let f = frame.0.min(self.total_frames - 1);
        self.banked = f as f64;
        self.position = self.banked;
        self.run_origin = None;
        self.current = FrameIndex(f);
    }

    /// Change the speed multiplier without moving the current frame.
    pub fn set_speed(&mut self, speed: f64) {
        self.banked = self.position;
        self.run_origin = None;
        self.speed = sanitize_speed(speed);
    }

    /// Change the timeline length, clamping the current frame into it.
    pub fn set_total_frames(&mut self, total_frames: u64) {
        self.total_frames = total_frames.max(1);
        if self.current.0 >= self.total_frames {
            self.seek(FrameIndex(self.total_frames - 1));
        }
    }

    /// Advance to host timestamp `now`. Returns `None` unless playing.
    ///
    /// Timestamps earlier than the run origin count as zero elapsed time.
    pub fn tick(&mut self, now: Duration) -> Option<ClockTick> {
        if self.state != ClockState::Playing {
            return None;
        }
        let previous = self.current;

        let origin = *self.run_origin.get_or_insert(now);
        let elapsed = now.saturating_sub(origin).as_secs_f64();
        let mut position = self.banked + elapsed * self.fps.as_f64() * self.speed;

        let total = self.total_frames as f64;
        let mut wrapped = false;
        let mut ended = false;
        if position >= total {
            if self.looping {
                let cycles = (position / total).floor();
                position -= cycles * total;
                self.loops = self.loops.saturating_add(cycles as u64);
                wrapped = true;
            } else {
                position = total - 1.0;
                ended = true;
            }
            // Rebase so banked progress never grows past one cycle.
            self.banked = position;
            self.run_origin = Some(now);
        }

        self.position = position;
        self.current = FrameIndex((position.floor() as u64).min(self.total_frames - 1));
        if ended {
            self.pause();
        }

        Some(ClockTick {
            frame: self.current,
            previous,
            wrapped,
            ended,
        })
    }
}

fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
