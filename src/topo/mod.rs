//! Static topological sorter (component E).
//!
//! Pure function, no I/O: parses a list of SQL strings into individual
//! statements, infers each statement's `provides`/`requires` object
//! references from its statement class, and emits a single deterministic
//! linear order together with diagnostics. This is the engine behind the
//! secondary "declarative files" mode (`analyze_and_sort` in the spec),
//! used when there is no live *branch* database to diff against — only a
//! pile of `.sql` files whose statements must be applied in a order that
//! respects whatever each statement provides and requires.
//!
//! Unlike the dependency planner (`crate::diff`), this module never talks
//! to a database: it works off the AST the SQL parser (`pg_query`) returns
//! for the text handed to it.

pub mod annotations;
pub mod ir;
pub mod parser;
pub mod sort;

use crate::engine_error::DiagnosticWarning;
pub use ir::{ObjectRef, Phase, StatementClass, StatementId, StatementNode};

/// One dependency edge in the statement graph, for introspection/debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub before: StatementId,
    pub after: StatementId,
}

#[derive(Debug, Clone, Default)]
pub struct GraphReport {
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub ordered: Vec<StatementNode>,
    pub diagnostics: Vec<DiagnosticWarning>,
    pub graph: GraphReport,
}

/// Parse `sqls` (one string per logical input, e.g. one per file), derive
/// `provides`/`requires` for every statement, and return them in a single
/// deterministic execution order.
///
/// `source_labels`, if given, supplies the label used in each `StatementId`
/// for the corresponding `sqls[i]` (the caller's file path, for example).
/// When omitted, the label defaults to `<input:i>` as described in the spec.
pub fn analyze_and_sort(sqls: &[String], source_labels: Option<&[String]>) -> AnalyzeResult {
    let mut diagnostics = Vec::new();
    let mut nodes = Vec::new();

    for (i, sql) in sqls.iter().enumerate() {
        let label = source_labels
            .and_then(|labels| labels.get(i))
            .cloned()
            .unwrap_or_else(|| format!("<input:{i}>"));

        let parsed = parser::parse_source(&label, sql, &mut diagnostics);
        nodes.extend(parsed);
    }

    sort::topo_sort(nodes, &mut diagnostics)
}
