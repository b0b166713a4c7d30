//! SQL rendering for role operations

use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;
use crate::diff::operations::{CommentOperation, RoleIdentifier, RoleOperation};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};

impl SqlRenderer for RoleOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RoleOperation::Create { role } => vec![render_create_role(role)],
            RoleOperation::Drop { identifier } => vec![render_drop_role(identifier)],
            RoleOperation::AlterAttributes {
                identifier,
                login,
                superuser,
                createdb,
                createrole,
                replication,
                inherit,
                connection_limit,
            } => render_alter_attributes(
                identifier,
                *login,
                *superuser,
                *createdb,
                *createrole,
                *replication,
                *inherit,
                *connection_limit,
            )
            .into_iter()
            .collect(),
            RoleOperation::SetConfig {
                identifier,
                name,
                value,
            } => vec![render_set_config(identifier, name, value.as_deref())],
            RoleOperation::GrantMembership { identifier, group } => {
                vec![RenderedSql::new(format!(
                    "GRANT {} TO {};",
                    quote_ident(group),
                    quote_ident(&identifier.name)
                ))]
            }
            RoleOperation::RevokeMembership { identifier, group } => {
                vec![RenderedSql::new(format!(
                    "REVOKE {} FROM {};",
                    quote_ident(group),
                    quote_ident(&identifier.name)
                ))]
            }
            RoleOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let name = match self {
            RoleOperation::Create { role } => role.name.clone(),
            RoleOperation::Drop { identifier }
            | RoleOperation::AlterAttributes { identifier, .. }
            | RoleOperation::SetConfig { identifier, .. }
            | RoleOperation::GrantMembership { identifier, .. }
            | RoleOperation::RevokeMembership { identifier, .. } => identifier.name.clone(),
            RoleOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    target.name.clone()
                }
            },
        };
        DbObjectId::Role { name }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, RoleOperation::Drop { .. })
    }
}

fn render_create_role(role: &Role) -> RenderedSql {
    let mut sql = format!("CREATE ROLE {}", quote_ident(&role.name));
    sql.push_str(&format!(" WITH{}", attribute_clause(
        role.login,
        role.superuser,
        role.createdb,
        role.createrole,
        role.replication,
        role.inherit,
        role.connection_limit,
    )));
    sql.push(';');
    RenderedSql::new(sql)
}

fn render_drop_role(identifier: &RoleIdentifier) -> RenderedSql {
    RenderedSql::destructive(format!("DROP ROLE {};", quote_ident(&identifier.name)))
}

#[allow(clippy::too_many_arguments)]
fn attribute_clause(
    login: bool,
    superuser: bool,
    createdb: bool,
    createrole: bool,
    replication: bool,
    inherit: bool,
    connection_limit: i32,
) -> String {
    let mut parts = Vec::new();
    parts.push(if login { "LOGIN" } else { "NOLOGIN" });
    parts.push(if superuser { "SUPERUSER" } else { "NOSUPERUSER" });
    parts.push(if createdb { "CREATEDB" } else { "NOCREATEDB" });
    parts.push(if createrole { "CREATEROLE" } else { "NOCREATEROLE" });
    parts.push(if replication { "REPLICATION" } else { "NOREPLICATION" });
    parts.push(if inherit { "INHERIT" } else { "NOINHERIT" });
    let limit = format!("CONNECTION LIMIT {}", connection_limit);
    format!(" {} {}", parts.join(" "), limit)
}

#[allow(clippy::too_many_arguments)]
fn render_alter_attributes(
    identifier: &RoleIdentifier,
    login: Option<bool>,
    superuser: Option<bool>,
    createdb: Option<bool>,
    createrole: Option<bool>,
    replication: Option<bool>,
    inherit: Option<bool>,
    connection_limit: Option<i32>,
) -> Option<RenderedSql> {
    let mut parts = Vec::new();

    if let Some(v) = login {
        parts.push(if v { "LOGIN" } else { "NOLOGIN" }.to_string());
    }
    if let Some(v) = superuser {
        parts.push(if v { "SUPERUSER" } else { "NOSUPERUSER" }.to_string());
    }
    if let Some(v) = createdb {
        parts.push(if v { "CREATEDB" } else { "NOCREATEDB" }.to_string());
    }
    if let Some(v) = createrole {
        parts.push(if v { "CREATEROLE" } else { "NOCREATEROLE" }.to_string());
    }
    if let Some(v) = replication {
        parts.push(if v { "REPLICATION" } else { "NOREPLICATION" }.to_string());
    }
    if let Some(v) = inherit {
        parts.push(if v { "INHERIT" } else { "NOINHERIT" }.to_string());
    }
    if let Some(limit) = connection_limit {
        parts.push(format!("CONNECTION LIMIT {}", limit));
    }

    if parts.is_empty() {
        return None;
    }

    Some(RenderedSql::new(format!(
        "ALTER ROLE {} WITH {};",
        quote_ident(&identifier.name),
        parts.join(" ")
    )))
}

fn render_set_config(identifier: &RoleIdentifier, name: &str, value: Option<&str>) -> RenderedSql {
    let sql = match value {
        Some(v) => format!(
            "ALTER ROLE {} SET {} = {};",
            quote_ident(&identifier.name),
            name,
            escape_string(v)
        ),
        None => format!(
            "ALTER ROLE {} RESET {};",
            quote_ident(&identifier.name),
            name
        ),
    };
    RenderedSql::new(sql)
}
