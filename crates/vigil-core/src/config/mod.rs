//! Configuration system for Vigil.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod refinement_config;
pub mod report_config;
pub mod validation_config;
pub mod vigil_config;

pub use refinement_config::RefinementConfig;
pub use report_config::ReportConfig;
pub use validation_config::ValidationConfig;
pub use vigil_config::{CliOverrides, VigilConfig};
