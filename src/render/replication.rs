//! SQL rendering for logical replication: publications and subscriptions.

use crate::catalog::id::DbObjectId;
use crate::catalog::replication::{Publication, Subscription};
use crate::diff::operations::{
    CommentOperation, PublicationOperation, SubscriptionOperation,
};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

fn publish_options_clause(publication: &Publication) -> String {
    let mut parts = Vec::new();
    if !publication.publish_insert {
        parts.push("insert".to_string());
    }
    // PostgreSQL's WITH (publish = '...') takes a comma list of the *enabled*
    // actions; the default is all four, so we only emit it when something
    // differs from the default. Mirrors the asymmetry in the underlying GUC.
    let enabled: Vec<&str> = [
        (publication.publish_insert, "insert"),
        (publication.publish_update, "update"),
        (publication.publish_delete, "delete"),
        (publication.publish_truncate, "truncate"),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| name)
    .collect();

    let mut options = Vec::new();
    if enabled.len() != 4 {
        options.push(format!("publish = '{}'", enabled.join(", ")));
    }
    if publication.via_root {
        options.push("publish_via_partition_root = true".to_string());
    }
    let _ = parts; // shape kept for readability; publish list built above
    if options.is_empty() {
        String::new()
    } else {
        format!(" WITH ({})", options.join(", "))
    }
}

fn render_create_publication(publication: &Publication) -> RenderedSql {
    let mut sql = format!("CREATE PUBLICATION {}", quote_ident(&publication.name));
    if publication.all_tables {
        sql.push_str(" FOR ALL TABLES");
    } else if !publication.tables.is_empty() {
        let tables = publication
            .tables
            .iter()
            .map(|(schema, name)| format!("{}.{}", quote_ident(schema), quote_ident(name)))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" FOR TABLE {tables}"));
    }
    sql.push_str(&publish_options_clause(publication));
    sql.push(';');
    RenderedSql::new(sql)
}

impl SqlRenderer for PublicationOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            PublicationOperation::Create { publication } => {
                vec![render_create_publication(publication)]
            }
            PublicationOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP PUBLICATION {};",
                quote_ident(&identifier.name)
            ))],
            PublicationOperation::AlterTables { identifier, add, drop } => {
                let mut statements = Vec::new();
                if !add.is_empty() {
                    let tables = add
                        .iter()
                        .map(|(schema, name)| format!("{}.{}", quote_ident(schema), quote_ident(name)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    statements.push(RenderedSql::new(format!(
                        "ALTER PUBLICATION {} ADD TABLE {};",
                        quote_ident(&identifier.name),
                        tables
                    )));
                }
                if !drop.is_empty() {
                    let tables = drop
                        .iter()
                        .map(|(schema, name)| format!("{}.{}", quote_ident(schema), quote_ident(name)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    statements.push(RenderedSql::new(format!(
                        "ALTER PUBLICATION {} DROP TABLE {};",
                        quote_ident(&identifier.name),
                        tables
                    )));
                }
                statements
            }
            PublicationOperation::AlterOptions { identifier, publication } => {
                vec![RenderedSql::new(format!(
                    "ALTER PUBLICATION {}{};",
                    quote_ident(&identifier.name),
                    publish_options_clause(publication)
                ))]
            }
            PublicationOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let name = match self {
            PublicationOperation::Create { publication } => publication.name.clone(),
            PublicationOperation::Drop { identifier }
            | PublicationOperation::AlterTables { identifier, .. }
            | PublicationOperation::AlterOptions { identifier, .. } => identifier.name.clone(),
            PublicationOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    target.name.clone()
                }
            },
        };
        DbObjectId::Publication { name }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, PublicationOperation::Drop { .. })
    }
}

fn render_create_subscription(subscription: &Subscription) -> RenderedSql {
    let conninfo = subscription
        .conninfo
        .iter()
        .map(|e| format!("{}={}", e.key, e.value))
        .collect::<Vec<_>>()
        .join(" ");
    let publications = subscription.publications.join(", ");
    let mut options = vec![format!("enabled = {}", subscription.enabled)];
    if let Some(slot) = &subscription.slot_name {
        options.push(format!("slot_name = '{slot}'"));
    }
    RenderedSql::new(format!(
        "CREATE SUBSCRIPTION {} CONNECTION '{conninfo}' PUBLICATION {publications} WITH ({});",
        quote_ident(&subscription.name),
        options.join(", ")
    ))
}

impl SqlRenderer for SubscriptionOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SubscriptionOperation::Create { subscription } => {
                vec![render_create_subscription(subscription)]
            }
            SubscriptionOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP SUBSCRIPTION {};",
                quote_ident(&identifier.name)
            ))],
            SubscriptionOperation::AlterEnabled { identifier, enabled } => {
                let verb = if *enabled { "ENABLE" } else { "DISABLE" };
                vec![RenderedSql::new(format!(
                    "ALTER SUBSCRIPTION {} {verb};",
                    quote_ident(&identifier.name)
                ))]
            }
            SubscriptionOperation::AlterPublications {
                identifier,
                publications,
            } => vec![RenderedSql::new(format!(
                "ALTER SUBSCRIPTION {} SET PUBLICATION {};",
                quote_ident(&identifier.name),
                publications.join(", ")
            ))],
            SubscriptionOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let name = match self {
            SubscriptionOperation::Create { subscription } => subscription.name.clone(),
            SubscriptionOperation::Drop { identifier }
            | SubscriptionOperation::AlterEnabled { identifier, .. }
            | SubscriptionOperation::AlterPublications { identifier, .. } => identifier.name.clone(),
            SubscriptionOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    target.name.clone()
                }
            },
        };
        DbObjectId::Subscription { name }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, SubscriptionOperation::Drop { .. })
    }
}
