//! Refinement loop configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the refinement orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RefinementConfig {
    /// Maximum generate/validate cycles per session. Default: 3.
    pub attempt_budget: Option<u32>,
    /// Characters of the previous candidate echoed into the next prompt. Default: 2000.
    pub excerpt_chars: Option<usize>,
    /// Optional wall-clock ceiling across all attempts of a session.
    pub deadline_secs: Option<u64>,
    /// System context passed to the generation backend.
    pub system_context: Option<String>,
}

impl RefinementConfig {
    pub fn effective_attempt_budget(&self) -> u32 {
        self.attempt_budget.unwrap_or(3)
    }

    pub fn effective_excerpt_chars(&self) -> usize {
        self.excerpt_chars.unwrap_or(2000)
    }
}
