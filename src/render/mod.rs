//! Offline hand-off: ordered frame evaluation, per-frame fingerprints and the render-job
//! document consumed by the external renderer.

pub mod fingerprint;
pub mod job;
pub mod offline;
