use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;

/// Identifier for a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIdentifier {
    pub name: String,
}

impl RoleIdentifier {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn from_role(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
        }
    }
}

impl CommentTarget for RoleIdentifier {
    const OBJECT_TYPE: &'static str = "ROLE";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }
}

/// Operations that can be performed on roles.
///
/// Each attribute-bearing field is `Some` only when it changed, so `AlterAttributes`
/// renders as a single minimal `ALTER ROLE ... WITH ...` statement. Config and
/// membership changes are their own variants since each maps to a distinct
/// statement (`ALTER ROLE ... SET`/`RESET`, `GRANT`/`REVOKE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOperation {
    Create {
        role: Box<Role>,
    },
    Drop {
        identifier: RoleIdentifier,
    },
    AlterAttributes {
        identifier: RoleIdentifier,
        login: Option<bool>,
        superuser: Option<bool>,
        createdb: Option<bool>,
        createrole: Option<bool>,
        replication: Option<bool>,
        inherit: Option<bool>,
        connection_limit: Option<i32>,
    },
    SetConfig {
        identifier: RoleIdentifier,
        name: String,
        value: Option<String>,
    },
    GrantMembership {
        identifier: RoleIdentifier,
        group: String,
    },
    RevokeMembership {
        identifier: RoleIdentifier,
        group: String,
    },
    Comment(CommentOperation<RoleIdentifier>),
}

impl RoleOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterAttributes { .. }
            | Self::SetConfig { .. }
            | Self::GrantMembership { .. }
            | Self::RevokeMembership { .. }
            | Self::Comment(_) => OperationKind::Alter,
        }
    }
}
