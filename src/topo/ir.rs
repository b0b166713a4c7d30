//! Intermediate representation shared by the static sorter's parser and
//! sort passes: object references, statement classes, phases, and the node
//! type the graph is built from.

use std::collections::BTreeSet;
use std::fmt;

/// A reference to a database object as inferred from SQL text, e.g.
/// `relation:app.t`, `function:app.f`, `type:app.status`, `role:app_ro`.
/// Unlike `crate::catalog::id::DbObjectId` this carries no argument-type
/// signature and is not validated against a live catalog — it is a bare
/// string built purely from parsed syntax, matched by equality against
/// other statements' `provides` sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef(pub String);

impl ObjectRef {
    pub fn new(kind: &str, qualified: impl AsRef<str>) -> Self {
        ObjectRef(format!("{kind}:{}", qualified.as_ref()))
    }

    pub fn file(label: &str) -> Self {
        ObjectRef(format!("file:{label}"))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse statement-class tag, used both to label a `StatementNode` and to
/// break ties during sorting (pg_dump-inspired priority order, see
/// `StatementClass::priority`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatementClass {
    CreateSchema,
    CreateRole,
    CreateExtension,
    CreateType,
    CreateDomain,
    CreateSequence,
    CreateFunction,
    CreateTable,
    AlterTable,
    AddConstraint,
    CreateView,
    CreateMaterializedView,
    CreateTrigger,
    CreatePolicy,
    CreateIndex,
    Grant,
    Comment,
    Other,
    Unparseable,
}

impl StatementClass {
    /// pg_dump-inspired priority used as the second tie-breaker after phase.
    pub fn priority(self) -> u8 {
        match self {
            StatementClass::CreateSchema => 0,
            StatementClass::CreateRole => 1,
            StatementClass::CreateExtension => 2,
            StatementClass::CreateType | StatementClass::CreateDomain => 3,
            StatementClass::CreateSequence => 4,
            StatementClass::CreateFunction => 5,
            StatementClass::CreateTable => 6,
            StatementClass::AlterTable => 7,
            StatementClass::AddConstraint => 8,
            StatementClass::CreateView | StatementClass::CreateMaterializedView => 9,
            StatementClass::CreateTrigger => 10,
            StatementClass::CreatePolicy => 11,
            StatementClass::CreateIndex => 12,
            StatementClass::Grant => 13,
            StatementClass::Comment => 14,
            StatementClass::Other => 15,
            StatementClass::Unparseable => 16,
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            StatementClass::CreateRole | StatementClass::CreateExtension | StatementClass::CreateSchema => {
                Phase::Bootstrap
            }
            StatementClass::CreateType
            | StatementClass::CreateDomain
            | StatementClass::CreateSequence
            | StatementClass::CreateFunction => Phase::PreData,
            StatementClass::CreateTable | StatementClass::AlterTable => Phase::DataStructures,
            StatementClass::CreateView
            | StatementClass::CreateMaterializedView
            | StatementClass::CreateTrigger => Phase::Routines,
            StatementClass::AddConstraint | StatementClass::CreatePolicy | StatementClass::CreateIndex => {
                Phase::PostData
            }
            StatementClass::Grant | StatementClass::Comment => Phase::Privileges,
            StatementClass::Other | StatementClass::Unparseable => Phase::DataStructures,
        }
    }
}

/// The six coarse-grained execution phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Bootstrap,
    PreData,
    DataStructures,
    Routines,
    PostData,
    Privileges,
}

impl Phase {
    pub fn parse(s: &str) -> Option<Phase> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bootstrap" => Some(Phase::Bootstrap),
            "pre_data" => Some(Phase::PreData),
            "data_structures" => Some(Phase::DataStructures),
            "routines" => Some(Phase::Routines),
            "post_data" => Some(Phase::PostData),
            "privileges" => Some(Phase::Privileges),
            _ => None,
        }
    }
}

/// Stable identity of one statement within the whole `analyze_and_sort` call:
/// the label of the source string it came from, plus its ordinal position
/// (0-based) within the statements parsed out of that source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId {
    pub source_label: String,
    pub statement_index: usize,
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source_label, self.statement_index)
    }
}

#[derive(Debug, Clone)]
pub struct StatementNode {
    pub id: StatementId,
    pub sql: String,
    pub class: StatementClass,
    pub phase: Phase,
    pub provides: BTreeSet<ObjectRef>,
    pub requires: BTreeSet<ObjectRef>,
}
