use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::replication::{Publication, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationIdentifier {
    pub name: String,
}

impl CommentTarget for PublicationIdentifier {
    const OBJECT_TYPE: &'static str = "PUBLICATION";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationOperation {
    Create {
        publication: Publication,
    },
    Drop {
        identifier: PublicationIdentifier,
    },
    /// `ALTER PUBLICATION ... ADD/DROP TABLE`, one statement per table.
    AlterTables {
        identifier: PublicationIdentifier,
        add: Vec<(String, String)>,
        drop: Vec<(String, String)>,
    },
    /// Only re-emitted when a publish-option (`insert`/`update`/`delete`/`truncate`/`via_root`)
    /// changed; recreates the full `WITH (...)` clause since PostgreSQL has no incremental form.
    AlterOptions {
        identifier: PublicationIdentifier,
        publication: Publication,
    },
    Comment(CommentOperation<PublicationIdentifier>),
}

impl PublicationOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterTables { .. } | Self::AlterOptions { .. } | Self::Comment(_) => {
                OperationKind::Alter
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionIdentifier {
    pub name: String,
}

impl CommentTarget for SubscriptionIdentifier {
    const OBJECT_TYPE: &'static str = "SUBSCRIPTION";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOperation {
    Create {
        subscription: Subscription,
    },
    Drop {
        identifier: SubscriptionIdentifier,
    },
    AlterEnabled {
        identifier: SubscriptionIdentifier,
        enabled: bool,
    },
    AlterPublications {
        identifier: SubscriptionIdentifier,
        publications: Vec<String>,
    },
    /// Connection-string changes are never emitted: `subconninfo` is masked
    /// key-for-key at extraction, so two subscriptions whose conninfo differs
    /// only in environment-dependent fields (host, port, password, ...) diff equal.
    Comment(CommentOperation<SubscriptionIdentifier>),
}

impl SubscriptionOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterEnabled { .. } | Self::AlterPublications { .. } | Self::Comment(_) => {
                OperationKind::Alter
            }
        }
    }
}
