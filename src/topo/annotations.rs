//! `-- pg-topo:` directive grammar (spec §6.6), plus the legacy whole-file
//! `-- require: <path>[, <path>...]` form inherited from the teacher's
//! `schema_loader`, kept as sugar for one or more `depends_on` directives.

use crate::engine_error::DiagnosticWarning;
use crate::topo::ir::{ObjectRef, Phase};

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub phase: Option<Phase>,
    pub requires: Vec<ObjectRef>,
    pub provides: Vec<ObjectRef>,
    pub depends_on: Vec<String>,
}

/// Parse the contiguous leading `--` comment lines in `leading_trivia` as
/// `pg-topo:` directives. Parsing stops at the first non-comment,
/// non-blank line reading backwards from the statement (i.e. only the
/// block of comment lines immediately preceding the statement is
/// considered — blank lines or SQL further back are not).
pub fn parse_leading_annotations(
    leading_trivia: &str,
    statement_index: usize,
    diagnostics: &mut Vec<DiagnosticWarning>,
) -> Annotations {
    let mut out = Annotations::default();

    // Walk backwards collecting a contiguous run of comment/blank lines,
    // then parse that run forwards so ordering of multiple directives is
    // preserved.
    let lines: Vec<&str> = leading_trivia.lines().collect();
    let mut start = lines.len();
    for (idx, line) in lines.iter().enumerate().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            start = idx;
        } else {
            break;
        }
    }

    for line in &lines[start..] {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("-- pg-topo:") {
            parse_directive(rest.trim(), statement_index, &mut out, diagnostics);
        } else if let Some(rest) = trimmed.strip_prefix("-- require:") {
            for dep in rest.split(',') {
                let dep = dep.trim();
                if !dep.is_empty() {
                    out.depends_on.push(normalize_require_path(dep));
                }
            }
        }
    }

    out
}

fn normalize_require_path(dep: &str) -> String {
    if dep.ends_with(".sql") {
        dep.to_string()
    } else {
        format!("{dep}.sql")
    }
}

fn parse_directive(
    rest: &str,
    statement_index: usize,
    out: &mut Annotations,
    diagnostics: &mut Vec<DiagnosticWarning>,
) {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let directive = parts.next().unwrap_or("").trim();
    let value = parts.next().unwrap_or("").trim();

    match directive {
        "phase" => match Phase::parse(value) {
            Some(p) => out.phase = Some(p),
            None => diagnostics.push(DiagnosticWarning::InvalidAnnotation {
                statement_index,
                raw: format!("pg-topo:phase {value}"),
            }),
        },
        "requires" => match parse_kind_qualified(value) {
            Some(r) => out.requires.push(r),
            None => diagnostics.push(DiagnosticWarning::InvalidAnnotation {
                statement_index,
                raw: format!("pg-topo:requires {value}"),
            }),
        },
        "provides" => match parse_kind_qualified(value) {
            Some(r) => out.provides.push(r),
            None => diagnostics.push(DiagnosticWarning::InvalidAnnotation {
                statement_index,
                raw: format!("pg-topo:provides {value}"),
            }),
        },
        "depends_on" => {
            if value.is_empty() {
                diagnostics.push(DiagnosticWarning::InvalidAnnotation {
                    statement_index,
                    raw: "pg-topo:depends_on <empty>".to_string(),
                });
            } else {
                out.depends_on.push(value.to_string());
            }
        }
        other => diagnostics.push(DiagnosticWarning::InvalidAnnotation {
            statement_index,
            raw: format!("pg-topo:{other} {value}"),
        }),
    }
}

/// `requires`/`provides` annotation values are `<kind>:<qualified>`.
fn parse_kind_qualified(value: &str) -> Option<ObjectRef> {
    let (kind, qualified) = value.split_once(':')?;
    if kind.trim().is_empty() || qualified.trim().is_empty() {
        return None;
    }
    Some(ObjectRef::new(kind.trim(), qualified.trim()))
}
