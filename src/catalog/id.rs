/// A globally unique identifier for any database object in pgmt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbObjectId {
    Schema {
        name: String,
    },

    Table {
        schema: String,
        name: String,
    },

    View {
        schema: String,
        name: String,
    },

    Type {
        schema: String,
        name: String,
    },
    Domain {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Index {
        schema: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Grant {
        id: String, // Unique identifier: "grantee@object_type:object_name"
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    Comment {
        object_id: Box<DbObjectId>, // The object being commented on
    },
    Extension {
        name: String,
    },
    Aggregate {
        schema: String,
        name: String,
        arguments: String,
    },
    Policy {
        schema: String,
        table: String,
        name: String,
    },
    /// Cluster-scoped: a login/group role. Never schema-qualified.
    Role {
        name: String,
    },
    /// A single column on a table, used for column-level dependency edges
    /// (`pg_depend.refobjsubid > 0`) rather than as a first-class catalog entity.
    Column {
        schema: String,
        table: String,
        column: String,
    },
    /// Cluster-scoped: a `CREATE FOREIGN DATA WRAPPER`.
    ForeignDataWrapper {
        name: String,
    },
    /// Cluster-scoped: a `CREATE SERVER`.
    ForeignServer {
        name: String,
    },
    /// Cluster-scoped: a `CREATE USER MAPPING FOR <user_name> SERVER <server>`.
    UserMapping {
        server: String,
        user_name: String,
    },
    Publication {
        name: String,
    },
    Subscription {
        name: String,
    },
}

impl DbObjectId {
    /// Get the schema name for this object, if applicable.
    /// Returns None for schema-less objects like Schema (where name IS the schema),
    /// Extension (database-wide), Grant (uses composite ID), Role (cluster-wide), and
    /// Comment (delegates to inner).
    pub fn schema(&self) -> Option<&str> {
        match self {
            DbObjectId::Schema { name } => Some(name.as_str()),
            DbObjectId::Table { schema, .. }
            | DbObjectId::View { schema, .. }
            | DbObjectId::Type { schema, .. }
            | DbObjectId::Domain { schema, .. }
            | DbObjectId::Function { schema, .. }
            | DbObjectId::Sequence { schema, .. }
            | DbObjectId::Index { schema, .. }
            | DbObjectId::Constraint { schema, .. }
            | DbObjectId::Trigger { schema, .. }
            | DbObjectId::Policy { schema, .. }
            | DbObjectId::Column { schema, .. }
            | DbObjectId::Aggregate { schema, .. } => Some(schema.as_str()),
            DbObjectId::Grant { .. }
            | DbObjectId::Extension { .. }
            | DbObjectId::Role { .. }
            | DbObjectId::ForeignDataWrapper { .. }
            | DbObjectId::ForeignServer { .. }
            | DbObjectId::UserMapping { .. }
            | DbObjectId::Publication { .. }
            | DbObjectId::Subscription { .. } => None,
            DbObjectId::Comment { object_id } => object_id.schema(),
        }
    }

    /// Render the canonical `kind:qualifier` stable ID string for this object.
    ///
    /// This is the form described in the spec's identifier grammar: a kind tag, a colon, and a
    /// qualifier built from the object's schema-qualified name (and, for routines, its
    /// canonical argument-type list so overloads stay distinguishable). Parts that need
    /// quoting (mixed case, whitespace, punctuation) are rendered in double-quoted form.
    pub fn to_stable_id(&self) -> String {
        fn quote_if_needed(part: &str) -> String {
            let needs_quoting = part.is_empty()
                || !part
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
                || !part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if needs_quoting {
                format!("\"{}\"", part.replace('"', "\"\""))
            } else {
                part.to_string()
            }
        }

        fn qualified(schema: &str, name: &str) -> String {
            format!("{}.{}", quote_if_needed(schema), quote_if_needed(name))
        }

        match self {
            DbObjectId::Schema { name } => format!("schema:{}", quote_if_needed(name)),
            DbObjectId::Table { schema, name } => format!("table:{}", qualified(schema, name)),
            DbObjectId::View { schema, name } => format!("view:{}", qualified(schema, name)),
            DbObjectId::Type { schema, name } => format!("type:{}", qualified(schema, name)),
            DbObjectId::Domain { schema, name } => format!("domain:{}", qualified(schema, name)),
            DbObjectId::Function {
                schema,
                name,
                arguments,
            } => format!("function:{}({})", qualified(schema, name), arguments),
            DbObjectId::Sequence { schema, name } => {
                format!("sequence:{}", qualified(schema, name))
            }
            DbObjectId::Index { schema, name } => format!("index:{}", qualified(schema, name)),
            DbObjectId::Constraint {
                schema,
                table,
                name,
            } => format!(
                "constraint:{}.{}",
                qualified(schema, table),
                quote_if_needed(name)
            ),
            DbObjectId::Grant { id } => format!("grant:{id}"),
            DbObjectId::Trigger {
                schema,
                table,
                name,
            } => format!(
                "trigger:{}.{}",
                qualified(schema, table),
                quote_if_needed(name)
            ),
            DbObjectId::Policy {
                schema,
                table,
                name,
            } => format!(
                "policy:{}.{}",
                qualified(schema, table),
                quote_if_needed(name)
            ),
            DbObjectId::Comment { object_id } => format!("comment:{}", object_id.to_stable_id()),
            DbObjectId::Extension { name } => format!("extension:{}", quote_if_needed(name)),
            DbObjectId::Aggregate {
                schema,
                name,
                arguments,
            } => format!("aggregate:{}({})", qualified(schema, name), arguments),
            DbObjectId::Role { name } => format!("role:{}", quote_if_needed(name)),
            DbObjectId::Column {
                schema,
                table,
                column,
            } => format!(
                "column:{}.{}",
                qualified(schema, table),
                quote_if_needed(column)
            ),
            DbObjectId::ForeignDataWrapper { name } => {
                format!("fdw:{}", quote_if_needed(name))
            }
            DbObjectId::ForeignServer { name } => format!("server:{}", quote_if_needed(name)),
            DbObjectId::UserMapping { server, user_name } => format!(
                "user_mapping:{}.{}",
                quote_if_needed(server),
                quote_if_needed(user_name)
            ),
            DbObjectId::Publication { name } => format!("publication:{}", quote_if_needed(name)),
            DbObjectId::Subscription { name } => {
                format!("subscription:{}", quote_if_needed(name))
            }
        }
    }
}

pub trait DependsOn {
    fn id(&self) -> DbObjectId;
    fn depends_on(&self) -> &[DbObjectId];
}
