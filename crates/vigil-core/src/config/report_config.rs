//! Report output configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: "console" | "json". Default: "console".
    pub format: Option<String>,
    /// ANSI colors in console output. Default: true.
    pub color: Option<bool>,
}

impl ReportConfig {
    pub fn effective_format(&self) -> &str {
        self.format.as_deref().unwrap_or("console")
    }

    pub fn effective_color(&self) -> bool {
        self.color.unwrap_or(true)
    }
}
