//! Validation: runs the catalog over a code unit and scores the findings.

pub mod result;
pub mod validator;

pub use result::{ValidationResult, ValidationSummary};
pub use validator::Validator;
