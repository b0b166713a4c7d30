use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::fdw::{ForeignDataWrapper, ForeignServer, OptionEntry, UserMapping};
use crate::catalog::id::DbObjectId;

/// An `(ADD|SET|DROP key value)` option-list action, shared by FDWs, servers
/// and user mappings (spec §4.2 point 6: option lists diff element-wise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionAction {
    Add { key: String, value: String },
    Set { key: String, value: String },
    Drop { key: String },
}

/// Diff two option lists into `ADD`/`SET`/`DROP` actions, keyed by option name.
/// Both lists must already be masked (see `catalog::masking`); masked values
/// never produce spurious `SET` actions across environments.
pub fn diff_options(old: &[OptionEntry], new: &[OptionEntry]) -> Vec<OptionAction> {
    let mut actions = Vec::new();
    for entry in new {
        match old.iter().find(|o| o.key == entry.key) {
            None => actions.push(OptionAction::Add {
                key: entry.key.clone(),
                value: entry.value.clone(),
            }),
            Some(existing) if existing.value != entry.value => actions.push(OptionAction::Set {
                key: entry.key.clone(),
                value: entry.value.clone(),
            }),
            Some(_) => {}
        }
    }
    for entry in old {
        if !new.iter().any(|n| n.key == entry.key) {
            actions.push(OptionAction::Drop {
                key: entry.key.clone(),
            });
        }
    }
    actions
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdwIdentifier {
    pub name: String,
}

impl CommentTarget for FdwIdentifier {
    const OBJECT_TYPE: &'static str = "FOREIGN DATA WRAPPER";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::ForeignDataWrapper {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdwOperation {
    Create {
        fdw: ForeignDataWrapper,
    },
    Drop {
        identifier: FdwIdentifier,
    },
    AlterOptions {
        identifier: FdwIdentifier,
        actions: Vec<OptionAction>,
    },
    Comment(CommentOperation<FdwIdentifier>),
}

impl FdwOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterOptions { .. } | Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentifier {
    pub name: String,
}

impl CommentTarget for ServerIdentifier {
    const OBJECT_TYPE: &'static str = "SERVER";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::ForeignServer {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOperation {
    Create {
        server: ForeignServer,
    },
    Drop {
        identifier: ServerIdentifier,
    },
    AlterOptions {
        identifier: ServerIdentifier,
        actions: Vec<OptionAction>,
    },
    Comment(CommentOperation<ServerIdentifier>),
}

impl ServerOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterOptions { .. } | Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMappingIdentifier {
    pub server: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMappingOperation {
    Create {
        mapping: UserMapping,
    },
    Drop {
        identifier: UserMappingIdentifier,
    },
    AlterOptions {
        identifier: UserMappingIdentifier,
        actions: Vec<OptionAction>,
    },
}

impl UserMappingOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterOptions { .. } => OperationKind::Alter,
        }
    }
}
