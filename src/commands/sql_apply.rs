//! `pgmt sql-apply` — the spec's secondary mode (§1, §6.4): statically order
//! a directory of declarative `.sql` files by inferred object identity and
//! apply them round-by-round to a target database, bypassing the catalog
//! diff entirely. Useful when there is no live *branch* database to extract
//! a desired state from — only a pile of schema files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Args;

use crate::db::connection::connect_with_retry;
use crate::round_apply::{PlannedStatement, RoundApplyOptions, round_apply};
use crate::topo::analyze_and_sort;

#[derive(Args, Debug)]
pub struct SqlApplyArgs {
    /// Connection string for the target database
    pub database_url: String,

    /// Directory containing declarative `.sql` files
    #[arg(long)]
    pub from_dir: PathBuf,

    /// Maximum number of retry rounds before giving up on remaining statements
    #[arg(long, default_value = "5")]
    pub max_rounds: usize,

    /// Skip the post-apply function-body validation pass
    #[arg(long)]
    pub no_validate: bool,
}

/// Exit code convention from spec §6.4: 0 success, 1 failure, 2 diagnostics
/// only (warnings but no failed statements), 3 usage error.
pub async fn cmd_sql_apply(args: &SqlApplyArgs) -> Result<i32> {
    if !args.from_dir.is_dir() {
        eprintln!("❌ not a directory: {}", args.from_dir.display());
        return Ok(3);
    }

    let (sqls, labels) = read_sql_files(&args.from_dir)?;
    if sqls.is_empty() {
        println!("No .sql files found under {}", args.from_dir.display());
        return Ok(0);
    }

    let analysis = analyze_and_sort(&sqls, Some(&labels));
    for diag in &analysis.diagnostics {
        println!("⚠️  {diag}");
    }

    let statements: Vec<PlannedStatement> = analysis
        .ordered
        .iter()
        .filter(|node| !node.sql.trim().is_empty())
        .map(|node| PlannedStatement {
            stable_id: format!("{}", node.id),
            sql: node.sql.clone(),
        })
        .collect();

    let pool = connect_with_retry(&args.database_url).await?;

    let options = RoundApplyOptions {
        max_rounds: args.max_rounds,
        disable_check_function_bodies: false,
        final_validation: !args.no_validate,
        cancel: Some(Arc::new(AtomicBool::new(false))),
    };

    let result = round_apply(&pool, statements, options, |round| {
        println!(
            "round {}: applied {}, skipped {}",
            round.round,
            round.applied.len(),
            round.skipped.len()
        );
        for err in &round.errors {
            println!(
                "   ❌ {} [{}]: {}",
                err.stable_id,
                err.sqlstate.as_deref().unwrap_or("?"),
                err.message
            );
        }
    })
    .await
    .context("round apply failed")?;

    println!(
        "applied {}/{} statements over {} round(s)",
        result.total_applied,
        result.total_applied + result.total_skipped,
        result.total_rounds
    );

    use crate::round_apply::ApplyStatus;
    Ok(match result.status {
        ApplyStatus::Success if analysis.diagnostics.is_empty() => 0,
        ApplyStatus::Success => 2,
        ApplyStatus::PartialFailure | ApplyStatus::ValidationFailed => 1,
    })
}

fn read_sql_files(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut paths = Vec::new();
    collect_sql_paths(dir, &mut paths)?;
    paths.sort();

    let mut sqls = Vec::with_capacity(paths.len());
    let mut labels = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        labels.push(
            path.strip_prefix(dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned(),
        );
        sqls.push(content);
    }
    Ok((sqls, labels))
}

fn collect_sql_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_sql_paths(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("sql") {
            out.push(path);
        }
    }
    Ok(())
}
