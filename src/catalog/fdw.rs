//! Foreign-data infrastructure: foreign data wrappers, foreign servers and
//! user mappings. Grouped in one module because all three share the same
//! `(ADD|SET|DROP key value)` option-list shape (spec: option lists are an
//! ordered sequence of actions for ALTERs, a key -> value mapping for state).

use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::masking::mask_option_value;
use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A single masked `key = value` entry in an option list, ordered by key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OptionEntry {
    pub key: String,
    pub value: String,
}

fn parse_options(raw: &[String]) -> Vec<OptionEntry> {
    let mut entries: Vec<OptionEntry> = raw
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| OptionEntry {
            key: key.to_string(),
            value: mask_option_value(key, value),
        })
        .collect();
    entries.sort();
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignDataWrapper {
    pub name: String,
    pub handler: Option<String>,
    pub validator: Option<String>,
    pub options: Vec<OptionEntry>,
    pub owner: String,
    pub comment: Option<String>,
}

impl DependsOn for ForeignDataWrapper {
    fn id(&self) -> DbObjectId {
        DbObjectId::ForeignDataWrapper {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &[]
    }
}

impl Commentable for ForeignDataWrapper {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch_fdws(conn: &mut PgConnection) -> Result<Vec<ForeignDataWrapper>> {
    info!("Fetching foreign data wrappers...");
    let rows = sqlx::query!(
        r#"
        SELECT
            w.fdwname AS name,
            h.proname AS "handler?",
            v.proname AS "validator?",
            w.fdwoptions AS "options?: Vec<String>",
            o.rolname AS "owner!",
            d.description AS "comment?"
        FROM pg_foreign_data_wrapper w
        JOIN pg_roles o ON o.oid = w.fdwowner
        LEFT JOIN pg_proc h ON h.oid = w.fdwhandler
        LEFT JOIN pg_proc v ON v.oid = w.fdwvalidator
        LEFT JOIN pg_description d ON d.objoid = w.oid AND d.objsubid = 0
        ORDER BY w.fdwname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ForeignDataWrapper {
            name: row.name,
            handler: row.handler,
            validator: row.validator,
            options: parse_options(&row.options.unwrap_or_default()),
            owner: row.owner,
            comment: row.comment,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignServer {
    pub name: String,
    pub fdw_name: String,
    pub server_type: Option<String>,
    pub server_version: Option<String>,
    pub options: Vec<OptionEntry>,
    pub owner: String,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for ForeignServer {
    fn id(&self) -> DbObjectId {
        DbObjectId::ForeignServer {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for ForeignServer {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch_servers(conn: &mut PgConnection) -> Result<Vec<ForeignServer>> {
    info!("Fetching foreign servers...");
    let rows = sqlx::query!(
        r#"
        SELECT
            s.srvname AS name,
            w.fdwname AS "fdw_name!",
            s.srvtype AS "server_type?",
            s.srvversion AS "server_version?",
            s.srvoptions AS "options?: Vec<String>",
            o.rolname AS "owner!",
            d.description AS "comment?"
        FROM pg_foreign_server s
        JOIN pg_foreign_data_wrapper w ON w.oid = s.srvfdw
        JOIN pg_roles o ON o.oid = s.srvowner
        LEFT JOIN pg_description d ON d.objoid = s.oid AND d.objsubid = 0
        ORDER BY s.srvname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ForeignServer {
            depends_on: vec![DbObjectId::ForeignDataWrapper {
                name: row.fdw_name.clone(),
            }],
            name: row.name,
            fdw_name: row.fdw_name,
            server_type: row.server_type,
            server_version: row.server_version,
            options: parse_options(&row.options.unwrap_or_default()),
            owner: row.owner,
            comment: row.comment,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    pub server: String,
    /// Role name, or `"PUBLIC"` for the wildcard mapping.
    pub user_name: String,
    pub options: Vec<OptionEntry>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for UserMapping {
    fn id(&self) -> DbObjectId {
        DbObjectId::UserMapping {
            server: self.server.clone(),
            user_name: self.user_name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

pub async fn fetch_user_mappings(conn: &mut PgConnection) -> Result<Vec<UserMapping>> {
    info!("Fetching user mappings...");
    let rows = sqlx::query!(
        r#"
        SELECT
            s.srvname AS "server!",
            CASE WHEN u.umuser = 0 THEN 'PUBLIC' ELSE r.rolname END AS "user_name!",
            u.umoptions AS "options?: Vec<String>"
        FROM pg_user_mapping u
        JOIN pg_foreign_server s ON s.oid = u.umserver
        LEFT JOIN pg_roles r ON r.oid = u.umuser
        ORDER BY s.srvname, user_name
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut depends_on = vec![DbObjectId::ForeignServer {
                name: row.server.clone(),
            }];
            if row.user_name != "PUBLIC" {
                depends_on.push(DbObjectId::Role {
                    name: row.user_name.clone(),
                });
            }
            UserMapping {
                server: row.server,
                user_name: row.user_name,
                options: parse_options(&row.options.unwrap_or_default()),
                depends_on,
            }
        })
        .collect())
}
