//! Refinement: the bounded, feedback-driven generation loop.

pub mod backend;
pub mod directive;
pub mod orchestrator;
pub mod session;

pub use backend::{extract_code, GenerationBackend};
pub use directive::{DirectiveItem, RefinementDirective, PERSISTED_FLAG};
pub use orchestrator::{Orchestrator, RefinementOptions};
pub use session::{Attempt, ExhaustionReason, Outcome, RefinementRequest, RefinementSession};
