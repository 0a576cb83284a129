//! Vigil analysis: rule catalog, context classifier, validator, scorer,
//! refinement orchestrator, and reporters.

pub mod refinement;
pub mod reporters;
pub mod rules;
pub mod scoring;
pub mod validation;

pub use refinement::{GenerationBackend, Orchestrator, Outcome, RefinementSession};
pub use rules::{Finding, RuleCatalog, Severity, UnitIdentity, UnitRole};
pub use scoring::{Score, Scorer};
pub use validation::{ValidationResult, Validator};
