//! Shared rendering for `pgmt diff` and `pgmt migrate diff`.
//!
//! Both commands compute the same shape of result - an ordered list of
//! `MigrationStep`s between a "from" catalog and a "to" catalog - and just
//! differ in where the catalogs come from and what the output means
//! (preview vs. drift detection). This module owns the shared output
//! formatting so the two commands can't drift apart.

use crate::catalog::Catalog;
use crate::diff::operations::MigrationStep;
use crate::render::{RenderedSql, Safety, SqlRenderer};
use anyhow::Result;
use console::style;
use std::fs;
use std::path::Path;

/// Output format for diff commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DiffFormat {
    /// One line per change, grants collapsed
    Summary,
    /// Full rendered SQL, grouped safe/destructive
    Detailed,
    /// Raw SQL only, suitable for piping or saving with --output-sql
    Sql,
}

/// Labels describing the two catalogs being compared, used purely for
/// human-readable headers - the Differ itself is label-agnostic.
pub struct DiffContext {
    pub from_label: String,
    pub to_label: String,
}

impl DiffContext {
    pub fn new(from_label: impl Into<String>, to_label: impl Into<String>) -> Self {
        Self {
            from_label: from_label.into(),
            to_label: to_label.into(),
        }
    }
}

/// Returns true if the ordered step list contains any changes at all.
pub fn has_differences(steps: &[MigrationStep]) -> bool {
    !steps.is_empty()
}

/// Render the ordered steps to stdout (and optionally to a file) according
/// to the requested format.
pub fn output_diff(
    steps: &[MigrationStep],
    format: &DiffFormat,
    context: &DiffContext,
    _from_catalog: &Catalog,
    _to_catalog: &Catalog,
    output_sql: Option<&str>,
) -> Result<()> {
    let rendered: Vec<RenderedSql> = steps.iter().flat_map(|step| step.to_sql()).collect();

    if steps.is_empty() {
        println!(
            "No differences found between {} and {}.",
            context.from_label, context.to_label
        );
    } else {
        match format {
            DiffFormat::Summary => print_summary(steps, context),
            DiffFormat::Detailed => print_detailed(steps, &rendered, context),
            DiffFormat::Sql => print_sql(&rendered),
        }
    }

    if let Some(path) = output_sql {
        write_sql_file(&rendered, path)?;
    }

    Ok(())
}

fn print_summary(steps: &[MigrationStep], context: &DiffContext) {
    println!(
        "\nDiff: {} -> {}",
        context.from_label, context.to_label
    );

    let non_grants: Vec<_> = steps.iter().filter(|s| !s.is_grant()).collect();
    let grant_count = steps.iter().filter(|s| s.is_grant()).count();

    for step in &non_grants {
        let icon = if step.has_destructive_sql() {
            "  ⚠"
        } else {
            "  ✓"
        };
        println!("{} {}", icon, step.summary());
    }
    if grant_count > 0 {
        println!(
            "  + {} grant/privilege change{}",
            grant_count,
            if grant_count == 1 { "" } else { "s" }
        );
    }

    println!(
        "\n{} change{} total",
        steps.len(),
        if steps.len() == 1 { "" } else { "s" }
    );
}

fn print_detailed(steps: &[MigrationStep], rendered: &[RenderedSql], context: &DiffContext) {
    println!(
        "\n{}",
        style(format!(
            "Diff: {} -> {}",
            context.from_label, context.to_label
        ))
        .bold()
        .underlined()
    );

    let safe_count = rendered.iter().filter(|s| s.safety == Safety::Safe).count();
    let destructive_count = rendered
        .iter()
        .filter(|s| s.safety == Safety::Destructive)
        .count();

    println!(
        "  {} safe operation{}",
        safe_count,
        if safe_count == 1 { "" } else { "s" }
    );
    if destructive_count > 0 {
        println!(
            "  ⚠ {} destructive operation{}",
            destructive_count,
            if destructive_count == 1 { "" } else { "s" }
        );
    }
    println!();

    for step in steps {
        let icon = if step.has_destructive_sql() { "⚠" } else { "✓" };
        println!("{} {}", icon, step.summary());
    }

    println!();
    for rendered_sql in rendered {
        let label = match rendered_sql.safety {
            Safety::Safe => style("SAFE").green(),
            Safety::Destructive => style("DESTRUCTIVE").red(),
        };
        println!("-- [{label}]");
        println!("{}", rendered_sql.sql);
    }
}

fn print_sql(rendered: &[RenderedSql]) {
    for rendered_sql in rendered {
        println!("{}", rendered_sql.sql);
    }
}

fn write_sql_file(rendered: &[RenderedSql], path: &str) -> Result<()> {
    let mut contents = String::new();
    for rendered_sql in rendered {
        contents.push_str(&rendered_sql.sql);
        contents.push('\n');
    }
    fs::write(Path::new(path), contents)?;
    println!("\nSQL written to {path}");
    Ok(())
}
