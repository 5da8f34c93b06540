//! Presentation time to frame index.

pub mod clock;
