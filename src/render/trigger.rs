//! SQL rendering for trigger operations

use crate::catalog::id::DbObjectId;
use crate::diff::operations::{TriggerIdentifier, TriggerOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for TriggerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            // `definition` is the full statement from `pg_get_triggerdef`,
            // already a complete `CREATE TRIGGER ...` — stored and replayed
            // byte-for-byte per spec's server-canonical string handling.
            TriggerOperation::Create { trigger } => {
                vec![RenderedSql::new(format!(
                    "{};",
                    trigger.definition.trim_end_matches(';')
                ))]
            }
            TriggerOperation::Drop { identifier } => {
                vec![render_drop_trigger(identifier)]
            }
            TriggerOperation::Replace { new_trigger, .. } => {
                // PostgreSQL 14+ supports CREATE OR REPLACE TRIGGER; swap the
                // leading keyword on the server-reported definition rather
                // than reconstructing the statement ourselves.
                let def = new_trigger.definition.trim_end_matches(';');
                let replaced = if let Some(rest) = def.strip_prefix("CREATE TRIGGER") {
                    format!("CREATE OR REPLACE TRIGGER{rest}")
                } else {
                    def.to_string()
                };
                vec![RenderedSql::new(format!("{replaced};"))]
            }
            TriggerOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            TriggerOperation::Create { trigger } => DbObjectId::Trigger {
                schema: trigger.schema.clone(),
                table: trigger.table_name.clone(),
                name: trigger.name.clone(),
            },
            TriggerOperation::Drop { identifier } => identifier.db_object_id(),
            TriggerOperation::Replace { new_trigger, .. } => DbObjectId::Trigger {
                schema: new_trigger.schema.clone(),
                table: new_trigger.table_name.clone(),
                name: new_trigger.name.clone(),
            },
            TriggerOperation::Comment(op) => match op {
                crate::diff::operations::CommentOperation::Set { target, .. }
                | crate::diff::operations::CommentOperation::Drop { target } => {
                    target.db_object_id()
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, TriggerOperation::Drop { .. })
    }
}

fn render_drop_trigger(identifier: &TriggerIdentifier) -> RenderedSql {
    RenderedSql::destructive(format!(
        "DROP TRIGGER {} ON {}.{};",
        quote_ident(&identifier.name),
        quote_ident(&identifier.schema),
        quote_ident(&identifier.table)
    ))
}
