use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A single `ALTER ROLE ... SET <name> = <value>` configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    pub name: String,
    pub value: String,
}

/// Represents a PostgreSQL cluster role (login or group).
///
/// Passwords are never extracted: `pg_authid.rolpassword` is a credential,
/// not schema, so the extractor never selects it and the differ never
/// compares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,

    pub login: bool,
    pub superuser: bool,
    pub createdb: bool,
    pub createrole: bool,
    pub replication: bool,
    pub inherit: bool,

    /// NULL = unlimited connections.
    pub connection_limit: i32,

    /// `ALTER ROLE name SET guc = value` entries, ordered by config name.
    pub config: Vec<RoleConfig>,

    /// Group roles this role is a member of, ordered by name.
    pub member_of: Vec<String>,

    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Role {
    fn id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Role {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all cluster roles, excluding PostgreSQL's built-in `pg_*` roles.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Role>> {
    info!("Fetching roles...");

    let roles = sqlx::query!(
        r#"
        SELECT
            r.oid,
            r.rolname AS name,
            r.rolcanlogin AS login,
            r.rolsuper AS superuser,
            r.rolcreatedb AS createdb,
            r.rolcreaterole AS createrole,
            r.rolreplication AS replication,
            r.rolinherit AS inherit,
            r.rolconnlimit AS connection_limit,
            d.description AS "comment?"
        FROM pg_roles r
        LEFT JOIN pg_shdescription d ON d.objoid = r.oid
        WHERE r.rolname NOT LIKE 'pg\_%'
        ORDER BY r.rolname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let memberships = sqlx::query!(
        r#"
        SELECT
            m.member,
            r.rolname AS "member_of!"
        FROM pg_auth_members m
        JOIN pg_roles r ON r.oid = m.roleid
        ORDER BY r.rolname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let configs = sqlx::query!(
        r#"
        SELECT
            s.setrole,
            unnest(s.setconfig) AS "setting!"
        FROM pg_db_role_setting s
        WHERE s.setdatabase = 0 OR s.setdatabase = (SELECT oid FROM pg_database WHERE datname = current_database())
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();

    for row in roles {
        let member_of: Vec<String> = memberships
            .iter()
            .filter(|m| m.member == Some(row.oid))
            .map(|m| m.member_of.clone())
            .collect();

        let mut config: Vec<RoleConfig> = configs
            .iter()
            .filter(|c| c.setrole == row.oid)
            .filter_map(|c| c.setting.split_once('=').map(|(k, v)| RoleConfig {
                name: k.trim().to_string(),
                value: v.trim().to_string(),
            }))
            .collect();
        config.sort_by(|a, b| a.name.cmp(&b.name));

        result.push(Role {
            name: row.name,
            login: row.login,
            superuser: row.superuser,
            createdb: row.createdb,
            createrole: row.createrole,
            replication: row.replication,
            inherit: row.inherit,
            connection_limit: row.connection_limit,
            config,
            member_of,
            comment: row.comment,
            depends_on: Vec::new(),
        });
    }

    Ok(result)
}
