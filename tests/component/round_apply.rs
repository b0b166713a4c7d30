//! Integration tests for the round-based apply engine (component F).

use crate::helpers::harness::with_test_db;
use anyhow::Result;
use pgmt::round_apply::{ApplyStatus, PlannedStatement, RoundApplyOptions, round_apply};

fn stmt(stable_id: &str, sql: &str) -> PlannedStatement {
    PlannedStatement {
        stable_id: stable_id.to_string(),
        sql: sql.to_string(),
    }
}

fn options(max_rounds: usize) -> RoundApplyOptions {
    RoundApplyOptions {
        max_rounds,
        disable_check_function_bodies: false,
        final_validation: false,
        cancel: None,
    }
}

#[tokio::test]
async fn applies_all_statements_in_one_round_when_order_is_correct() -> Result<()> {
    with_test_db(async |db| {
        let statements = vec![
            stmt("schema:s", "CREATE SCHEMA s"),
            stmt("table:s.t", "CREATE TABLE s.t (id int PRIMARY KEY)"),
        ];

        let result = round_apply(db.pool(), statements, options(3), |_| {})
            .await
            .unwrap();

        assert_eq!(result.status, ApplyStatus::Success);
        assert_eq!(result.total_applied, 2);
        assert_eq!(result.total_rounds, 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn retries_undefined_table_into_a_later_round() -> Result<()> {
    with_test_db(async |db| {
        db.execute("CREATE SCHEMA s").await;

        // view before its table: first round fails with undefined_table,
        // second round succeeds once the table exists.
        let statements = vec![
            stmt("view:s.v", "CREATE VIEW s.v AS SELECT * FROM s.t"),
            stmt("table:s.t", "CREATE TABLE s.t (id int)"),
        ];

        let result = round_apply(db.pool(), statements, options(3), |_| {})
            .await
            .unwrap();

        assert_eq!(result.status, ApplyStatus::Success);
        assert_eq!(result.total_applied, 2);
        assert_eq!(result.total_rounds, 2);
        assert_eq!(result.rounds[0].applied, vec!["table:s.t".to_string()]);
        assert_eq!(result.rounds[1].applied, vec!["view:s.v".to_string()]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn non_retryable_error_is_reported_as_partial_failure() -> Result<()> {
    with_test_db(async |db| {
        db.execute("CREATE SCHEMA s").await;
        db.execute("CREATE TABLE s.t (id int NOT NULL)").await;

        let statements = vec![stmt(
            "data:s.t.bad_row",
            "INSERT INTO s.t (id) VALUES (NULL)",
        )];

        let result = round_apply(db.pool(), statements, options(3), |_| {})
            .await
            .unwrap();

        assert_eq!(result.status, ApplyStatus::PartialFailure);
        assert_eq!(result.total_applied, 0);
        assert_eq!(result.total_skipped, 1);
        assert_eq!(result.rounds.len(), 1);
        assert_eq!(result.rounds[0].errors.len(), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn stops_retrying_once_a_round_makes_no_progress() -> Result<()> {
    with_test_db(async |db| {
        // Nothing ever creates `s.missing`, so this never resolves; the
        // engine must stop after the first round rather than spin through
        // every remaining round.
        let statements = vec![stmt(
            "view:s.v",
            "CREATE VIEW s.v AS SELECT * FROM s.missing",
        )];

        let result = round_apply(db.pool(), statements, options(5), |_| {})
            .await
            .unwrap();

        assert_eq!(result.status, ApplyStatus::PartialFailure);
        assert_eq!(result.rounds.len(), 1);

        Ok(())
    })
    .await
}
