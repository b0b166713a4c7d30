//! Hierarchical and scalable migration operations
//!
//! This module provides a more maintainable approach to migration steps
//! using hierarchical enums and trait-based rendering.

use crate::catalog::id::DbObjectId;

// Re-export SqlRenderer from render module
pub use crate::render::SqlRenderer;

pub use aggregate::*;
pub use comments::*;
pub use constraint::*;
pub use domain::*;
pub use extension::*;
pub use fdw::*;
pub use function::*;
pub use grant::*;
pub use index::*;
pub use policy::*;
pub use replication::*;
pub use role::*;
pub use schema::*;
pub use sequence::*;
pub use table::*;
pub use trigger::*;
pub use types::*;
pub use view::*;

pub mod aggregate;
pub mod comments;
pub mod constraint;
pub mod domain;
pub mod extension;
pub mod fdw;
pub mod function;
pub mod grant;
pub mod index;
pub mod policy;
pub mod replication;
pub mod role;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

/// Coarse-grained classification of an operation, used by cascade filtering
/// and the dependency planner's class-priority tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Alter,
    Drop,
}

/// Main migration step - hierarchical structure for scalability
#[derive(Debug, Clone)]
pub enum MigrationStep {
    Schema(SchemaOperation),
    Table(TableOperation),
    View(ViewOperation),
    Type(TypeOperation),
    Domain(DomainOperation),
    Sequence(SequenceOperation),
    Function(FunctionOperation),
    Aggregate(AggregateOperation),
    Index(IndexOperation),
    Constraint(ConstraintOperation),
    Trigger(TriggerOperation),
    Extension(ExtensionOperation),
    Grant(GrantOperation),
    Policy(PolicyOperation),
    Role(RoleOperation),
    Fdw(FdwOperation),
    Server(ServerOperation),
    UserMapping(UserMappingOperation),
    Publication(PublicationOperation),
    Subscription(SubscriptionOperation),
}

impl MigrationStep {
    /// Returns the database object ID for this migration step
    pub fn id(&self) -> DbObjectId {
        self.db_object_id()
    }

    /// Returns true if this step is a destructive operation (drop)
    pub fn is_drop(&self) -> bool {
        self.is_destructive()
    }

    /// Returns the coarse-grained operation kind (create/alter/drop).
    ///
    /// Delegates to `is_drop()`/`is_create()` rather than each inner operation's
    /// own `operation_kind()`, since not every `*Operation` type defines one.
    pub fn operation_kind(&self) -> OperationKind {
        if self.is_drop() {
            OperationKind::Drop
        } else if self.is_create() {
            OperationKind::Create
        } else {
            OperationKind::Alter
        }
    }

    /// Returns true if this step is a create operation
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            MigrationStep::Schema(SchemaOperation::Create { .. })
                | MigrationStep::Extension(ExtensionOperation::Create { .. })
                | MigrationStep::Table(TableOperation::Create { .. })
                | MigrationStep::View(ViewOperation::Create { .. })
                | MigrationStep::Type(TypeOperation::Create { .. })
                | MigrationStep::Domain(DomainOperation::Create { .. })
                | MigrationStep::Sequence(SequenceOperation::Create { .. })
                | MigrationStep::Function(FunctionOperation::Create { .. })
                | MigrationStep::Aggregate(AggregateOperation::Create { .. })
                | MigrationStep::Index(IndexOperation::Create { .. })
                | MigrationStep::Constraint(ConstraintOperation::Create(_))
                | MigrationStep::Trigger(TriggerOperation::Create { .. })
                | MigrationStep::Grant(GrantOperation::Grant { .. })
                | MigrationStep::Policy(PolicyOperation::Create { .. })
                | MigrationStep::Role(RoleOperation::Create { .. })
                | MigrationStep::Fdw(FdwOperation::Create { .. })
                | MigrationStep::Server(ServerOperation::Create { .. })
                | MigrationStep::UserMapping(UserMappingOperation::Create { .. })
                | MigrationStep::Publication(PublicationOperation::Create { .. })
                | MigrationStep::Subscription(SubscriptionOperation::Create { .. })
        )
    }

    /// Returns true if this step is a "relationship" step that creates circular dependencies
    /// These steps should be executed in a second phase after all primary object creation
    pub fn is_relationship(&self) -> bool {
        match self {
            MigrationStep::Sequence(SequenceOperation::AlterOwnership { .. }) => true,
            MigrationStep::Constraint(ConstraintOperation::Create(constraint)) => {
                matches!(
                    constraint.constraint_type,
                    crate::catalog::constraint::ConstraintType::ForeignKey { .. }
                )
            }
            _ => false,
        }
    }

    /// Returns step-level dependencies that may not be in the catalog's forward_deps.
    /// This is used for dynamically generated steps (like REVOKE for missing defaults)
    /// that aren't part of the catalog but still need proper ordering.
    pub fn dependencies(&self) -> Vec<DbObjectId> {
        match self {
            MigrationStep::Grant(GrantOperation::Grant { grant }) => grant.depends_on.clone(),
            MigrationStep::Grant(GrantOperation::Revoke { grant }) => grant.depends_on.clone(),
            MigrationStep::Role(RoleOperation::GrantMembership { group, .. }) => {
                vec![DbObjectId::Role {
                    name: group.clone(),
                }]
            }
            // Other operations use catalog.forward_deps exclusively
            _ => vec![],
        }
    }

    /// Returns true if this step is a grant/revoke, so callers can collapse
    /// the (often numerous) privilege changes into a single summary line.
    pub fn is_grant(&self) -> bool {
        matches!(self, MigrationStep::Grant(_))
    }

    /// Returns true if any statement this step renders is destructive.
    pub fn has_destructive_sql(&self) -> bool {
        self.to_sql().iter().any(|s| s.safety == crate::render::Safety::Destructive)
    }

    /// One-line human-readable description of the change, for concise plan output.
    pub fn summary(&self) -> String {
        let verb = match self.operation_kind() {
            OperationKind::Create => "create",
            OperationKind::Alter => "alter",
            OperationKind::Drop => "drop",
        };
        format!("{verb} {}", self.id().to_stable_id())
    }
}
