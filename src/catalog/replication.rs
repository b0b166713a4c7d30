//! Logical replication: publications and subscriptions.

use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::fdw::OptionEntry;
use crate::catalog::masking::mask_conninfo;
use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub name: String,
    pub owner: String,
    pub all_tables: bool,
    pub publish_insert: bool,
    pub publish_update: bool,
    pub publish_delete: bool,
    pub publish_truncate: bool,
    pub via_root: bool,
    /// Schema-qualified tables explicitly added, ordered; empty when `all_tables`.
    pub tables: Vec<(String, String)>,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Publication {
    fn id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Publication {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch_publications(conn: &mut PgConnection) -> Result<Vec<Publication>> {
    info!("Fetching publications...");
    let rows = sqlx::query!(
        r#"
        SELECT
            p.oid,
            p.pubname AS name,
            o.rolname AS "owner!",
            p.puballtables AS all_tables,
            p.pubinsert AS publish_insert,
            p.pubupdate AS publish_update,
            p.pubdelete AS publish_delete,
            p.pubtruncate AS publish_truncate,
            p.pubviaroot AS via_root,
            d.description AS "comment?"
        FROM pg_publication p
        JOIN pg_roles o ON o.oid = p.pubowner
        LEFT JOIN pg_description d ON d.objoid = p.oid AND d.objsubid = 0
        ORDER BY p.pubname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let rel_rows = sqlx::query!(
        r#"
        SELECT
            pr.prpubid,
            n.nspname AS "schema!",
            c.relname AS "table!"
        FROM pg_publication_rel pr
        JOIN pg_class c ON c.oid = pr.prrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        ORDER BY n.nspname, c.relname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let tables: Vec<(String, String)> = rel_rows
                .iter()
                .filter(|r| r.prpubid == row.oid)
                .map(|r| (r.schema.clone(), r.table.clone()))
                .collect();

            let depends_on = tables
                .iter()
                .map(|(schema, name)| DbObjectId::Table {
                    schema: schema.clone(),
                    name: name.clone(),
                })
                .collect();

            Publication {
                name: row.name,
                owner: row.owner,
                all_tables: row.all_tables,
                publish_insert: row.publish_insert,
                publish_update: row.publish_update,
                publish_delete: row.publish_delete,
                publish_truncate: row.publish_truncate,
                via_root: row.via_root,
                tables,
                comment: row.comment,
                depends_on,
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    pub owner: String,
    pub enabled: bool,
    /// Masked `(key, __CONN_<KEY>__)` pairs; never the real `subconninfo`.
    pub conninfo: Vec<OptionEntry>,
    pub publications: Vec<String>,
    pub slot_name: Option<String>,
    pub synchronous_commit: String,
    pub comment: Option<String>,
}

impl DependsOn for Subscription {
    fn id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &[]
    }
}

impl Commentable for Subscription {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch subscriptions. `pg_subscription` is database-cluster-wide and only
/// readable by superusers; callers without sufficient privilege get an empty
/// catalog slice rather than a failed extraction, mirroring how FDW option
/// visibility already degrades per-role in PostgreSQL.
pub async fn fetch_subscriptions(conn: &mut PgConnection) -> Result<Vec<Subscription>> {
    info!("Fetching subscriptions...");
    let rows = sqlx::query!(
        r#"
        SELECT
            s.subname AS name,
            o.rolname AS "owner!",
            s.subenabled AS enabled,
            s.subconninfo AS conninfo,
            s.subpublications AS "publications!: Vec<String>",
            s.subslotname AS "slot_name?",
            s.subsynccommit AS synchronous_commit,
            d.description AS "comment?"
        FROM pg_subscription s
        JOIN pg_roles o ON o.oid = s.subowner
        LEFT JOIN pg_shdescription d ON d.objoid = s.oid
        ORDER BY s.subname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Subscription {
            name: row.name,
            owner: row.owner,
            enabled: row.enabled,
            conninfo: mask_conninfo(&row.conninfo),
            publications: row.publications,
            slot_name: row.slot_name,
            synchronous_commit: row.synchronous_commit,
            comment: row.comment,
        })
        .collect())
}
