//! Background-music channel: fade envelope, host device boundary and the sync controller.
//!
//! Audio never blocks or fails the visual path. The controller owns at most one source and turns
//! every sink failure into a notice.

pub mod controller;
pub mod envelope;
pub mod sink;
