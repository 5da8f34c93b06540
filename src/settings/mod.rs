//! The external settings record and the fixed background-music catalog.

pub mod catalog;
pub mod model;
