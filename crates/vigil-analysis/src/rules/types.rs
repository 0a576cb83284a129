//! Core types for the rule catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity levels for findings, most severe first.
///
/// The derived ordering follows declaration order, so `Critical < Info`;
/// "more lenient" means "greater".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[serde(alias = "medium")]
    Warning,
    Info,
}

impl Severity {
    /// Points deducted from the compliance score per finding record.
    pub fn penalty(&self) -> u32 {
        match self {
            Self::Critical => 25,
            Self::High => 10,
            Self::Warning => 5,
            Self::Info => 0,
        }
    }

    /// Critical and high findings block compliance.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    /// The more lenient of two severities.
    pub fn most_lenient(self, other: Severity) -> Severity {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "warning" | "medium" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn all() -> &'static [Severity] {
        &[Self::Critical, Self::High, Self::Warning, Self::Info]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared role of a code unit. Rules use it to decide applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitRole {
    Backend,
    Frontend,
    Service,
    Agent,
    Utility,
    Unknown,
}

impl UnitRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Service => "service",
            Self::Agent => "agent",
            Self::Utility => "utility",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "backend" | "api" | "server" => Some(Self::Backend),
            "frontend" | "ui" | "client" => Some(Self::Frontend),
            "service" => Some(Self::Service),
            "agent" => Some(Self::Agent),
            "utility" | "util" | "lib" => Some(Self::Utility),
            "unknown" | "any" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Guess a role from conventional path segments.
    ///
    /// The most specific segment wins: `src/services/api/x.ts` is a service
    /// because `services` is checked before `api`.
    pub fn infer_from_path(path: &str) -> Self {
        let normalized = path.replace('\\', "/").to_ascii_lowercase();
        let segments: Vec<&str> = normalized.split('/').collect();
        let dirs = &segments[..segments.len().saturating_sub(1)];
        let has = |names: &[&str]| dirs.iter().any(|d| names.contains(d));

        if has(&["agents", "agent"]) {
            Self::Agent
        } else if has(&["services", "service"]) {
            Self::Service
        } else if has(&["api", "routes", "server", "controllers", "handlers", "backend"]) {
            Self::Backend
        } else if has(&["components", "pages", "views", "frontend", "ui"]) {
            Self::Frontend
        } else if has(&["utils", "util", "lib", "helpers", "shared"]) {
            Self::Utility
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which code-unit roles a rule runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    Any,
    Roles(Vec<UnitRole>),
}

impl Applicability {
    pub fn roles(roles: &[UnitRole]) -> Self {
        Self::Roles(roles.to_vec())
    }

    pub fn applies_to(&self, role: UnitRole) -> bool {
        match self {
            Self::Any => true,
            Self::Roles(roles) => roles.contains(&role),
        }
    }
}

/// Identity of the code unit under validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIdentity {
    pub name: String,
    pub role: UnitRole,
}

impl UnitIdentity {
    pub fn new(name: impl Into<String>, role: UnitRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// Identity for a file, with the role inferred from its path.
    pub fn from_path(path: &str) -> Self {
        Self::new(path, UnitRole::infer_from_path(path))
    }
}

/// A line (1-based) with an optional column (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}", self.line, col),
            None => write!(f, "{}", self.line),
        }
    }
}

/// One raw detector hit, before exceptions are applied.
///
/// Presence detectors anchor a match to the offending text. Absence
/// detectors (a required collaborator is never mentioned) produce a match
/// with no offset that names what is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Byte offset of the match in the unit, when it has a position.
    pub offset: Option<usize>,
    pub location: Option<Location>,
    /// The verbatim matched text, or the name of what is missing.
    pub text: String,
    /// The full source line containing the match.
    pub line_text: Option<String>,
}

impl RawMatch {
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            offset: None,
            location: None,
            text: name.into(),
            line_text: None,
        }
    }
}

/// Verbatim offending text kept on a finding for operator legibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub line: Option<u32>,
    pub text: String,
    pub line_text: Option<String>,
}

/// One reported rule outcome. Produced fresh on every validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    /// Number of matches aggregated into this record.
    pub count: usize,
    pub locations: Vec<Location>,
    pub message: String,
    pub suggestion: Option<String>,
    pub evidence: Vec<Evidence>,
}

impl Finding {
    /// Line numbers of every located match, in source order.
    pub fn lines(&self) -> Vec<u32> {
        self.locations.iter().map(|l| l.line).collect()
    }
}
