//! Vigil core: errors, configuration, and tracing shared by every crate.

pub mod config;
pub mod errors;
pub mod tracing;
