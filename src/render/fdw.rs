//! SQL rendering for foreign-data-wrapper infrastructure: FDWs, servers and
//! user mappings.

use crate::catalog::fdw::{ForeignDataWrapper, ForeignServer, UserMapping};
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{
    CommentOperation, FdwIdentifier, FdwOperation, OptionAction, ServerIdentifier,
    ServerOperation, UserMappingIdentifier, UserMappingOperation,
};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};

fn render_options_clause(prefix: &str, options: &[(String, String)]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let entries = options
        .iter()
        .map(|(k, v)| format!("{} {}", k, escape_string(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" {prefix} ({entries})")
}

fn render_option_actions(actions: &[OptionAction]) -> String {
    let entries = actions
        .iter()
        .map(|action| match action {
            OptionAction::Add { key, value } => format!("ADD {} {}", key, escape_string(value)),
            OptionAction::Set { key, value } => format!("SET {} {}", key, escape_string(value)),
            OptionAction::Drop { key } => format!("DROP {}", key),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("OPTIONS ({entries})")
}

impl SqlRenderer for FdwOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            FdwOperation::Create { fdw } => vec![render_create_fdw(fdw)],
            FdwOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP FOREIGN DATA WRAPPER {};",
                quote_ident(&identifier.name)
            ))],
            FdwOperation::AlterOptions { identifier, actions } => {
                vec![RenderedSql::new(format!(
                    "ALTER FOREIGN DATA WRAPPER {} {};",
                    quote_ident(&identifier.name),
                    render_option_actions(actions)
                ))]
            }
            FdwOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let name = match self {
            FdwOperation::Create { fdw } => fdw.name.clone(),
            FdwOperation::Drop { identifier } | FdwOperation::AlterOptions { identifier, .. } => {
                identifier.name.clone()
            }
            FdwOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    target.name.clone()
                }
            },
        };
        DbObjectId::ForeignDataWrapper { name }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, FdwOperation::Drop { .. })
    }
}

fn render_create_fdw(fdw: &ForeignDataWrapper) -> RenderedSql {
    let mut sql = format!("CREATE FOREIGN DATA WRAPPER {}", quote_ident(&fdw.name));
    if let Some(handler) = &fdw.handler {
        sql.push_str(&format!(" HANDLER {}", quote_ident(handler)));
    }
    if let Some(validator) = &fdw.validator {
        sql.push_str(&format!(" VALIDATOR {}", quote_ident(validator)));
    }
    let options: Vec<(String, String)> = fdw
        .options
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();
    sql.push_str(&render_options_clause("OPTIONS", &options));
    sql.push(';');
    RenderedSql::new(sql)
}

impl SqlRenderer for ServerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ServerOperation::Create { server } => vec![render_create_server(server)],
            ServerOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP SERVER {};",
                quote_ident(&identifier.name)
            ))],
            ServerOperation::AlterOptions { identifier, actions } => {
                vec![RenderedSql::new(format!(
                    "ALTER SERVER {} {};",
                    quote_ident(&identifier.name),
                    render_option_actions(actions)
                ))]
            }
            ServerOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let name = match self {
            ServerOperation::Create { server } => server.name.clone(),
            ServerOperation::Drop { identifier }
            | ServerOperation::AlterOptions { identifier, .. } => identifier.name.clone(),
            ServerOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    target.name.clone()
                }
            },
        };
        DbObjectId::ForeignServer { name }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, ServerOperation::Drop { .. })
    }
}

fn render_create_server(server: &ForeignServer) -> RenderedSql {
    let mut sql = format!("CREATE SERVER {}", quote_ident(&server.name));
    if let Some(server_type) = &server.server_type {
        sql.push_str(&format!(" TYPE {}", escape_string(server_type)));
    }
    if let Some(version) = &server.server_version {
        sql.push_str(&format!(" VERSION {}", escape_string(version)));
    }
    sql.push_str(&format!(
        " FOREIGN DATA WRAPPER {}",
        quote_ident(&server.fdw_name)
    ));
    let options: Vec<(String, String)> = server
        .options
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();
    sql.push_str(&render_options_clause("OPTIONS", &options));
    sql.push(';');
    RenderedSql::new(sql)
}

impl SqlRenderer for UserMappingOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            UserMappingOperation::Create { mapping } => vec![render_create_mapping(mapping)],
            UserMappingOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP USER MAPPING FOR {} SERVER {};",
                mapping_user_sql(identifier),
                quote_ident(&identifier.server)
            ))],
            UserMappingOperation::AlterOptions { identifier, actions } => {
                vec![RenderedSql::new(format!(
                    "ALTER USER MAPPING FOR {} SERVER {} {};",
                    mapping_user_sql(identifier),
                    quote_ident(&identifier.server),
                    render_option_actions(actions)
                ))]
            }
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        let identifier = match self {
            UserMappingOperation::Create { mapping } => UserMappingIdentifier {
                server: mapping.server.clone(),
                user_name: mapping.user_name.clone(),
            },
            UserMappingOperation::Drop { identifier }
            | UserMappingOperation::AlterOptions { identifier, .. } => identifier.clone(),
        };
        DbObjectId::UserMapping {
            server: identifier.server,
            user_name: identifier.user_name,
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, UserMappingOperation::Drop { .. })
    }
}

fn mapping_user_sql(identifier: &UserMappingIdentifier) -> String {
    if identifier.user_name == "PUBLIC" {
        "PUBLIC".to_string()
    } else {
        quote_ident(&identifier.user_name)
    }
}

fn render_create_mapping(mapping: &UserMapping) -> RenderedSql {
    let identifier = UserMappingIdentifier {
        server: mapping.server.clone(),
        user_name: mapping.user_name.clone(),
    };
    let mut sql = format!(
        "CREATE USER MAPPING FOR {} SERVER {}",
        mapping_user_sql(&identifier),
        quote_ident(&mapping.server)
    );
    let options: Vec<(String, String)> = mapping
        .options
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect();
    sql.push_str(&render_options_clause("OPTIONS", &options));
    sql.push(';');
    RenderedSql::new(sql)
}
