//! Closed set of core engine error kinds.
//!
//! Every fallible operation in the catalog/diff/plan/apply pipeline ultimately
//! resolves to one of these variants. Command-layer code wraps `EngineError`
//! in `anyhow::Result` the same way the rest of the command layer does, so a
//! fatal error still prints with full context while the structured payload
//! (offending statement, stable ID, SQLSTATE) stays available to callers that
//! want to inspect it programmatically instead of just printing it.

use crate::catalog::id::DbObjectId;
use thiserror::Error;

/// A single server-reported error tied to one statement in a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub stable_id: String,
    pub sqlstate: Option<String>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// A catalog query failed during extraction. Fatal.
    #[error("extraction failed while running: {sql}\ncaused by: {source}")]
    Extraction {
        sql: String,
        #[source]
        source: anyhow::Error,
    },

    /// An internal invariant was violated by the differ (e.g. a stable-ID
    /// collision between two distinct entities). Fatal; indicates a bug.
    #[error("diff invariant violated for {stable_id}: {detail}")]
    Diff { stable_id: String, detail: String },

    /// The planner could not fully order a change set: an unbreakable cycle,
    /// or the refinement pass failed to converge. Non-fatal — the caller
    /// still receives a best-effort plan alongside this diagnostic.
    #[error("planning diagnostic: {detail}")]
    Planning { detail: String },

    /// A single DDL statement failed during apply. Non-fatal when `sqlstate`
    /// is in the retryable set (see `round_apply::is_retryable`).
    #[error("statement {} failed{}: {}", failure.stable_id, failure.sqlstate.as_deref().map(|s| format!(" [{s}]")).unwrap_or_default(), failure.message)]
    Statement { failure: StatementFailure },

    /// A function/procedure body failed the post-apply validation check.
    /// Non-fatal; reported alongside a successful apply.
    #[error("validation failed for {stable_id}: {message}")]
    Validation { stable_id: String, message: String },
}

impl EngineError {
    pub fn extraction(sql: impl Into<String>, source: anyhow::Error) -> Self {
        EngineError::Extraction {
            sql: sql.into(),
            source,
        }
    }

    pub fn diff_invariant(id: &DbObjectId, detail: impl Into<String>) -> Self {
        EngineError::Diff {
            stable_id: id.to_stable_id(),
            detail: detail.into(),
        }
    }

    pub fn planning(detail: impl Into<String>) -> Self {
        EngineError::Planning {
            detail: detail.into(),
        }
    }
}

/// Non-fatal static-analysis or planning diagnostics that ride alongside an
/// otherwise successful result rather than aborting the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticWarning {
    ParseError { statement_index: usize, message: String },
    UnknownStatementClass { statement_index: usize },
    UnresolvedDependency { statement_index: usize, reference: String },
    DuplicateProducer { reference: String, statement_indices: Vec<usize> },
    CycleDetected { statement_indices: Vec<usize> },
    InvalidAnnotation { statement_index: usize, raw: String },
}

impl std::fmt::Display for DiagnosticWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticWarning::ParseError { statement_index, message } => {
                write!(f, "PARSE_ERROR at statement {statement_index}: {message}")
            }
            DiagnosticWarning::UnknownStatementClass { statement_index } => {
                write!(f, "UNKNOWN_STATEMENT_CLASS at statement {statement_index}")
            }
            DiagnosticWarning::UnresolvedDependency { statement_index, reference } => {
                write!(
                    f,
                    "UNRESOLVED_DEPENDENCY at statement {statement_index}: {reference}"
                )
            }
            DiagnosticWarning::DuplicateProducer { reference, statement_indices } => {
                write!(
                    f,
                    "DUPLICATE_PRODUCER for {reference} at statements {statement_indices:?}"
                )
            }
            DiagnosticWarning::CycleDetected { statement_indices } => {
                write!(f, "CYCLE_DETECTED among statements {statement_indices:?}")
            }
            DiagnosticWarning::InvalidAnnotation { statement_index, raw } => {
                write!(f, "INVALID_ANNOTATION at statement {statement_index}: {raw}")
            }
        }
    }
}
