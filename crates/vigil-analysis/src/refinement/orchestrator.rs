//! Refinement orchestrator: the bounded generate/validate/refine state machine.
//!
//! ```text
//! Requesting -> Validating -> Succeeded
//!                          -> Exhausted
//!                          -> AwaitingRefinement -> Requesting
//! ```
//!
//! The attempt budget and the deadline are checked before every backend
//! call after the first, so an exhausted session never spends another call.

use std::time::{Duration, Instant};

use tracing::instrument;
use vigil_core::config::RefinementConfig;

use super::backend::{extract_code, GenerationBackend};
use super::directive::RefinementDirective;
use super::session::{Attempt, ExhaustionReason, Outcome, RefinementRequest, RefinementSession};
use crate::rules::UnitIdentity;
use crate::validation::Validator;

pub const DEFAULT_ATTEMPT_BUDGET: u32 = 3;
pub const DEFAULT_EXCERPT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOptions {
    /// Maximum attempts per session. Values below 1 are treated as 1.
    pub attempt_budget: u32,
    pub excerpt_chars: usize,
    /// Wall-clock ceiling across all attempts.
    pub deadline: Option<Duration>,
    pub system_context: String,
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            deadline: None,
            system_context: String::new(),
        }
    }
}

impl From<&RefinementConfig> for RefinementOptions {
    fn from(config: &RefinementConfig) -> Self {
        Self {
            attempt_budget: config.effective_attempt_budget(),
            excerpt_chars: config.effective_excerpt_chars(),
            deadline: config.deadline_secs.map(Duration::from_secs),
            system_context: config.system_context.clone().unwrap_or_default(),
        }
    }
}

enum State {
    Requesting { index: u32, prompt: String },
    Validating { index: u32, prompt: String, code: String },
    AwaitingRefinement { attempt: Attempt },
    Terminal(Outcome),
}

/// Drives one session at a time; independent sessions may run on
/// separate threads against the same orchestrator.
pub struct Orchestrator<B> {
    validator: Validator,
    backend: B,
    options: RefinementOptions,
}

impl<B: GenerationBackend> Orchestrator<B> {
    pub fn new(validator: Validator, backend: B) -> Self {
        Self {
            validator,
            backend,
            options: RefinementOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RefinementOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RefinementOptions {
        &self.options
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Caller-facing entry point.
    pub fn obtain_compliant_code(&self, spec: &str, unit: UnitIdentity) -> RefinementSession {
        self.run(RefinementRequest {
            spec: spec.to_string(),
            unit,
        })
    }

    #[instrument(skip_all, fields(unit = %request.unit.name, role = %request.unit.role))]
    pub fn run(&self, request: RefinementRequest) -> RefinementSession {
        let budget = self.options.attempt_budget.max(1);
        let started = Instant::now();
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut state = State::Requesting {
            index: 1,
            prompt: request.spec.clone(),
        };

        let outcome = loop {
            state = match state {
                State::Requesting { index, prompt } => {
                    let reply = self
                        .backend
                        .generate(&prompt, &self.options.system_context)
                        .and_then(|reply| extract_code(&reply));
                    match reply {
                        Ok(code) => State::Validating { index, prompt, code },
                        Err(error) => {
                            tracing::warn!(attempt = index, error = %error, "backend failed");
                            State::Terminal(Outcome::BackendFailed {
                                error,
                                attempts_used: attempts.len() as u32,
                            })
                        }
                    }
                }

                State::Validating { index, prompt, code } => {
                    let result = self.validator.validate(&code, &request.unit);
                    tracing::info!(
                        attempt = index,
                        score = result.compliance_score,
                        compliant = result.compliant,
                        violations = result.violations.len(),
                        "attempt validated"
                    );
                    let compliant = result.compliant;
                    let final_score = result.compliance_score;
                    let attempt = Attempt {
                        index,
                        prompt,
                        code,
                        result,
                        directive: None,
                    };

                    if compliant {
                        let code = attempt.code.clone();
                        attempts.push(attempt);
                        State::Terminal(Outcome::Succeeded {
                            code,
                            attempts_used: index,
                            final_score,
                        })
                    } else if index >= budget {
                        State::Terminal(exhausted(&mut attempts, attempt, ExhaustionReason::AttemptBudget))
                    } else {
                        State::AwaitingRefinement { attempt }
                    }
                }

                State::AwaitingRefinement { mut attempt } => {
                    if self.options.deadline.is_some_and(|d| started.elapsed() >= d) {
                        tracing::info!(attempt = attempt.index, "deadline reached");
                        State::Terminal(exhausted(&mut attempts, attempt, ExhaustionReason::Deadline))
                    } else {
                        let previous = attempts.last().map(|a| &a.result);
                        let directive = RefinementDirective::synthesize(
                            self.validator.catalog(),
                            &attempt.result,
                            previous,
                        );
                        if directive.escalated {
                            tracing::info!(
                                attempt = attempt.index,
                                persisted = ?directive.persisted_rules().collect::<Vec<_>>(),
                                "violations persisted; escalating"
                            );
                        }
                        let prompt = directive.build_prompt(
                            &request.spec,
                            &attempt.result,
                            &attempt.code,
                            self.options.excerpt_chars,
                        );
                        let index = attempt.index + 1;
                        attempt.directive = Some(directive);
                        attempts.push(attempt);
                        State::Requesting { index, prompt }
                    }
                }

                State::Terminal(outcome) => break outcome,
            };
        };

        tracing::info!(
            attempts = attempts.len(),
            success = outcome.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "session finished"
        );
        RefinementSession {
            request,
            attempts,
            outcome,
        }
    }
}

fn exhausted(attempts: &mut Vec<Attempt>, last: Attempt, reason: ExhaustionReason) -> Outcome {
    let last_result = last.result.clone();
    let attempts_used = last.index;
    attempts.push(last);
    Outcome::Exhausted {
        last_result,
        attempts_used,
        reason,
    }
}
