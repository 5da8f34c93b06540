//! Pure frame-indexed animation primitives.
//!
//! Every function here is a function of a frame number, never of wall-clock time, so the live
//! preview and the offline renderer compute identical values.

pub mod curve;
pub mod ease;
pub mod proc;
