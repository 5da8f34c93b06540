//! Frame/time primitives and the crate error type.

pub mod core;
pub mod error;
