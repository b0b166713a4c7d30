//! Round-based apply engine (component F).
//!
//! Executes an already-ordered plan against a live target with per-statement
//! error isolation: each statement runs inside its own savepoint, a failure
//! classified as "may succeed once more of the plan exists" is deferred to
//! a later round instead of aborting, and the whole apply lives inside one
//! outer transaction so a caller that never commits can run this as a dry
//! run. This generalizes the sequential, all-or-nothing `ApplyStepExecutor`
//! loop in `db::schema_executor` with the retry/round semantics the
//! dependency-inference gaps in SQL (dynamic SQL inside a function body,
//! for instance) make necessary.

pub mod retry;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::PgPool;
use sqlx::postgres::{PgDatabaseError, Postgres};
use sqlx::{Executor, Transaction};

use crate::engine_error::StatementFailure;

/// One statement to execute, already in final plan order.
#[derive(Debug, Clone)]
pub struct PlannedStatement {
    pub stable_id: String,
    pub sql: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementStatus {
    Pending,
    Retryable,
    Applied,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: usize,
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<StatementFailure>,
    /// Set when the session's cancel flag fired partway through this round.
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    Success,
    PartialFailure,
    ValidationFailed,
}

#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub stable_id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub status: ApplyStatus,
    pub total_rounds: usize,
    pub total_applied: usize,
    pub total_skipped: usize,
    pub rounds: Vec<RoundOutcome>,
    pub validation_errors: Vec<ValidationFailure>,
    pub cancelled: bool,
}

pub struct RoundApplyOptions {
    pub max_rounds: usize,
    pub disable_check_function_bodies: bool,
    pub final_validation: bool,
    /// Checked before each statement; set to request early termination
    /// (the session-level cancel in spec §5).
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RoundApplyOptions {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            disable_check_function_bodies: false,
            final_validation: true,
            cancel: None,
        }
    }
}

/// Run `statements` against `pool`, honoring the round/savepoint state
/// machine from spec §4.5. `on_round_complete` is invoked once per round
/// with that round's summary, mirroring the spec's `on_round_complete`
/// callback (used for progress reporting by callers; this module has no
/// progress-printing opinion of its own).
pub async fn round_apply(
    pool: &PgPool,
    statements: Vec<PlannedStatement>,
    options: RoundApplyOptions,
    mut on_round_complete: impl FnMut(&RoundOutcome),
) -> Result<ApplyResult, sqlx::Error> {
    let mut status: HashMap<usize, StatementStatus> = (0..statements.len())
        .map(|i| (i, StatementStatus::Pending))
        .collect();

    let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
    let mut rounds = Vec::new();
    let mut cancelled = false;

    let mut round_num = 0;
    loop {
        round_num += 1;
        let pending_indices: Vec<usize> = (0..statements.len())
            .filter(|i| {
                matches!(
                    status[i],
                    StatementStatus::Pending | StatementStatus::Retryable
                )
            })
            .collect();

        if pending_indices.is_empty() {
            break;
        }

        let mut round_applied = Vec::new();
        let mut round_errors = Vec::new();
        let mut made_progress = false;

        for &i in &pending_indices {
            if let Some(flag) = &options.cancel
                && flag.load(Ordering::SeqCst)
            {
                cancelled = true;
                break;
            }

            let stmt = &statements[i];
            let still_pending: Vec<String> = pending_indices
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| statements[j].stable_id.clone())
                .collect();

            let mut sp = tx.begin().await?;
            if options.disable_check_function_bodies {
                sp.execute("SET LOCAL check_function_bodies = off").await?;
            }

            match sp.execute(stmt.sql.as_str()).await {
                Ok(_) => {
                    sp.commit().await?;
                    status.insert(i, StatementStatus::Applied);
                    round_applied.push(stmt.stable_id.clone());
                    made_progress = true;
                }
                Err(e) => {
                    // `sp` drops here without commit, which issues
                    // `ROLLBACK TO SAVEPOINT` for us.
                    let (sqlstate, message) = classify_error(&e);
                    let retryable = sqlstate
                        .as_deref()
                        .map(|code| retry::is_retryable(code, &message, &still_pending))
                        .unwrap_or(false);

                    status.insert(
                        i,
                        if retryable {
                            StatementStatus::Retryable
                        } else {
                            StatementStatus::Failed
                        },
                    );
                    round_errors.push(StatementFailure {
                        stable_id: stmt.stable_id.clone(),
                        sqlstate,
                        message,
                    });
                }
            }
        }

        let round_skipped: Vec<String> = pending_indices
            .iter()
            .filter(|&&i| status[&i] == StatementStatus::Failed)
            .map(|&i| statements[i].stable_id.clone())
            .collect();

        let outcome = RoundOutcome {
            round: round_num,
            applied: round_applied,
            skipped: round_skipped,
            errors: round_errors,
            cancelled,
        };
        on_round_complete(&outcome);
        rounds.push(outcome);

        if cancelled {
            break;
        }
        if !made_progress {
            break;
        }
        if round_num >= options.max_rounds {
            break;
        }
    }

    let total_applied = status
        .values()
        .filter(|s| **s == StatementStatus::Applied)
        .count();
    let total_failed = statements.len() - total_applied;

    let mut validation_errors = Vec::new();
    let mut validation_ran = false;
    if options.final_validation && !cancelled && total_failed == 0 {
        validation_ran = true;
        validation_errors = run_final_validation(&mut tx).await?;
    }

    tx.commit().await?;

    let status_value = if cancelled || total_failed > 0 {
        ApplyStatus::PartialFailure
    } else if validation_ran && !validation_errors.is_empty() {
        ApplyStatus::ValidationFailed
    } else {
        ApplyStatus::Success
    };

    Ok(ApplyResult {
        status: status_value,
        total_rounds: rounds.len(),
        total_applied,
        total_skipped: total_failed,
        rounds,
        validation_errors,
        cancelled,
    })
}

fn classify_error(e: &sqlx::Error) -> (Option<String>, String) {
    if let Some(db_err) = e.as_database_error()
        && let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>()
    {
        return (Some(pg_err.code().to_string()), pg_err.message().to_string());
    }
    (None, e.to_string())
}

/// Re-validate every managed function/procedure body by re-running its
/// `pg_get_functiondef` text through a no-op `CREATE OR REPLACE` inside a
/// savepoint, per spec §4.5's final validation step. Failures are reported
/// without rolling back statements already applied this round.
async fn run_final_validation(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Vec<ValidationFailure>, sqlx::Error> {
    tx.execute("SET check_function_bodies = on").await?;
    sqlx::query("SELECT 1").execute(&mut *tx).await?;

    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT p.oid::text, pg_get_functiondef(p.oid)
        FROM pg_catalog.pg_proc p
        JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema')
          AND p.prokind IN ('f', 'p')
        ORDER BY p.oid
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut failures = Vec::new();
    for (oid, def) in rows {
        let mut sp = tx.begin().await?;
        if let Err(e) = sp.execute(def.as_str()).await {
            let (_, message) = classify_error(&e);
            failures.push(ValidationFailure {
                stable_id: format!("function:oid:{oid}"),
                message,
            });
            // drop rolls back this savepoint; continue validating the rest.
        } else {
            sp.commit().await?;
        }
    }

    Ok(failures)
}
