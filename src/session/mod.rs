//! Interactive preview session.

pub mod preview;
pub mod scheduler;
