use crate::catalog::Catalog;
use crate::constants::MIGRATION_FILENAME_PREFIX;
use crate::diff::operations::{MigrationStep, SqlRenderer};
use crate::diff::{cascade, diff_all, diff_order};
use anyhow::Result;

/// Input for migration generation - all pure data, no side effects
#[derive(Debug, Clone)]
pub struct MigrationGenerationInput {
    pub old_catalog: Catalog,
    pub new_catalog: Catalog,
    pub description: String,
    pub version: u64,
}

/// Result of migration generation - all pure data
#[derive(Debug, Clone)]
pub struct MigrationGenerationResult {
    pub migration_sql: String,
    pub migration_filename: String,
    pub steps: Vec<MigrationStep>,
    pub has_changes: bool,
}

/// Pure function to generate migration from two catalogs
/// No side effects - just transformation of data
pub fn generate_migration(input: MigrationGenerationInput) -> Result<MigrationGenerationResult> {
    let steps = diff_all(&input.old_catalog, &input.new_catalog);
    let expanded_steps = cascade::expand(steps, &input.old_catalog, &input.new_catalog);
    let ordered_steps = diff_order(expanded_steps, &input.old_catalog, &input.new_catalog)?;

    let has_changes = !ordered_steps.is_empty();

    let migration_sql = if has_changes {
        render_migration_steps(&ordered_steps)?
    } else {
        "-- No changes detected\n".to_string()
    };

    let sanitized_description = sanitize_description(&input.description);
    let migration_filename = format!(
        "{}{}_{}.sql",
        MIGRATION_FILENAME_PREFIX, input.version, sanitized_description
    );

    Ok(MigrationGenerationResult {
        migration_sql,
        migration_filename,
        steps: ordered_steps,
        has_changes,
    })
}

/// Pure function to render migration steps into SQL
fn render_migration_steps(steps: &[MigrationStep]) -> Result<String> {
    let mut sql_parts = Vec::new();

    for step in steps {
        let rendered_sqls = step.to_sql();
        for rendered in rendered_sqls {
            sql_parts.push(rendered.sql);
        }
    }

    Ok(sql_parts.join("\n\n"))
}

/// Pure function to sanitize migration description for filename
fn sanitize_description(description: &str) -> String {
    let mut result = String::new();
    let mut last_was_underscore = false;

    for c in description.chars() {
        if c.is_alphanumeric() {
            result.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            result.push('_');
            last_was_underscore = true;
        }
    }

    result.trim_matches('_').to_string()
}
