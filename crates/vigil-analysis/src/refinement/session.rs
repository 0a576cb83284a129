//! Refinement session types: request, attempts, terminal outcome.

use serde::{Deserialize, Serialize};
use vigil_core::errors::BackendError;

use super::directive::RefinementDirective;
use crate::rules::UnitIdentity;
use crate::validation::ValidationResult;

/// What a caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementRequest {
    /// The original requirements. Every prompt starts with them verbatim.
    pub spec: String,
    pub unit: UnitIdentity,
}

/// One generate/validate cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based.
    pub index: u32,
    pub prompt: String,
    pub code: String,
    pub result: ValidationResult,
    /// Derived from `result` and fed into the next attempt.
    pub directive: Option<RefinementDirective>,
}

/// Why a session ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionReason {
    AttemptBudget,
    Deadline,
}

/// Terminal state of a session. Exactly one per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded {
        code: String,
        attempts_used: u32,
        final_score: u32,
    },
    /// Not an error: the last result says exactly what remained wrong.
    Exhausted {
        last_result: ValidationResult,
        attempts_used: u32,
        reason: ExhaustionReason,
    },
    /// The backend could not produce a candidate.
    BackendFailed {
        #[serde(with = "backend_error_text")]
        error: BackendError,
        attempts_used: u32,
    },
}

impl Outcome {
    pub fn attempts_used(&self) -> u32 {
        match self {
            Self::Succeeded { attempts_used, .. }
            | Self::Exhausted { attempts_used, .. }
            | Self::BackendFailed { attempts_used, .. } => *attempts_used,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// The full lifecycle of one requested code unit. Owns its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementSession {
    pub request: RefinementRequest,
    pub attempts: Vec<Attempt>,
    pub outcome: Outcome,
}

impl RefinementSession {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// The accepted code, when the session succeeded.
    pub fn code(&self) -> Option<&str> {
        match self.outcome {
            Outcome::Succeeded { ref code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }
}

/// Backend errors serialize as their coded message.
mod backend_error_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use vigil_core::errors::{BackendError, VigilErrorCode};

    pub fn serialize<S: Serializer>(error: &BackendError, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&error.coded_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BackendError, D::Error> {
        let message = String::deserialize(d)?;
        Ok(BackendError::RequestFailed { message })
    }
}
