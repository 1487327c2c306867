//! Error and warning types for plan translation
//!
//! Domain inconsistencies abort a parse. Everything the parser can recover from
//! (branch stack anomalies, malformed lines) is reported as a [`TraceWarning`]
//! alongside a best-effort graph.

use std::fmt;
use std::path::PathBuf;

/// Which domain table a failed lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Operator,
    PreconditionEntry,
    Predicate,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Operator => write!(f, "operator"),
            LookupKind::PreconditionEntry => write!(f, "operator precondition entry"),
            LookupKind::Predicate => write!(f, "predicate or function"),
        }
    }
}

/// Errors that abort plan translation
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Could not find the {kind} '{name}' in the domain model (known: {})", known.join(", "))]
    DomainLookup {
        kind: LookupKind,
        name: String,
        known: Vec<String>,
    },

    #[error("Operator '{operator}' takes {expected} parameters but the plan gives {found}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid domain tables in {}: {message}", path.display())]
    DomainFormat { path: PathBuf, message: String },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Recoverable anomaly met while reading a plan trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceWarning {
    /// `pop` with fewer than two live branch points
    BranchStack { line_number: usize, token: String },
    /// `ramificate` with no continuation edge to duplicate
    EmptyBranchStack { line_number: usize, token: String },
    /// Line inside the plan block that carries no action token
    MalformedLine { line_number: usize, line: String },
    /// Action flagged as an observation outcome with no observation pending
    MissingObservation { line_number: usize, action: String },
}

impl fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceWarning::BranchStack { line_number, token } => write!(
                f,
                "line {}: '{}' needs two live branch points, stack left unchanged",
                line_number, token
            ),
            TraceWarning::EmptyBranchStack { line_number, token } => write!(
                f,
                "line {}: '{}' with an empty continuation stack",
                line_number, token
            ),
            TraceWarning::MalformedLine { line_number, line } => {
                write!(f, "line {}: skipped malformed line '{}'", line_number, line)
            }
            TraceWarning::MissingObservation {
                line_number,
                action,
            } => write!(
                f,
                "line {}: '{}' follows an observation outcome but no observation is pending",
                line_number, action
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_lookup_message_lists_known_names() {
        let err = PlanError::DomainLookup {
            kind: LookupKind::Operator,
            name: "fly".to_string(),
            known: vec!["move".to_string(), "pick".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("operator 'fly'"), "{}", msg);
        assert!(msg.contains("known: move, pick"), "{}", msg);
    }

    #[test]
    fn test_warning_display_carries_line_number() {
        let w = TraceWarning::BranchStack {
            line_number: 7,
            token: "pop".to_string(),
        };
        assert!(w.to_string().starts_with("line 7:"));
    }
}
