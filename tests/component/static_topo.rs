//! Tests for the static topological sorter (component E). These are pure —
//! no database required — since `analyze_and_sort` only ever parses SQL text.

use pgmt::topo::analyze_and_sort;

#[test]
fn view_before_its_table_is_reordered_after_it() {
    let sqls = vec![
        "CREATE VIEW v AS SELECT * FROM t;".to_string(),
        "CREATE TABLE t (id int PRIMARY KEY);".to_string(),
    ];
    let labels = vec!["01_view.sql".to_string(), "02_table.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    let order: Vec<&str> = result
        .ordered
        .iter()
        .map(|n| n.id.source_label.as_str())
        .collect();
    let table_pos = order.iter().position(|l| *l == "02_table.sql").unwrap();
    let view_pos = order.iter().position(|l| *l == "01_view.sql").unwrap();
    assert!(
        table_pos < view_pos,
        "table must be created before the view that selects from it"
    );
}

#[test]
fn foreign_key_forces_referenced_table_first() {
    let sqls = vec![
        "CREATE TABLE orders (id int PRIMARY KEY, customer_id int REFERENCES customers(id));"
            .to_string(),
        "CREATE TABLE customers (id int PRIMARY KEY);".to_string(),
    ];
    let labels = vec!["01_orders.sql".to_string(), "02_customers.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    let order: Vec<&str> = result
        .ordered
        .iter()
        .map(|n| n.id.source_label.as_str())
        .collect();
    let customers_pos = order
        .iter()
        .position(|l| *l == "02_customers.sql")
        .unwrap();
    let orders_pos = order.iter().position(|l| *l == "01_orders.sql").unwrap();
    assert!(customers_pos < orders_pos);
}

#[test]
fn independent_statements_keep_phase_then_source_order() {
    let sqls = vec![
        "CREATE SCHEMA a;".to_string(),
        "CREATE SCHEMA b;".to_string(),
    ];
    let labels = vec!["01_a.sql".to_string(), "02_b.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    let order: Vec<&str> = result
        .ordered
        .iter()
        .map(|n| n.id.source_label.as_str())
        .collect();
    assert_eq!(order, vec!["01_a.sql", "02_b.sql"]);
}

#[test]
fn unparseable_sql_is_diagnosed_instead_of_panicking() {
    let sqls = vec!["CREATE TABLE (((( not valid sql".to_string()];
    let labels = vec!["broken.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    assert!(
        !result.diagnostics.is_empty(),
        "unparseable input should surface a diagnostic, not panic"
    );
}

#[test]
fn unresolved_dependency_is_diagnosed_but_does_not_block_ordering() {
    let sqls = vec!["CREATE VIEW v AS SELECT * FROM nonexistent_table;".to_string()];
    let labels = vec!["only_view.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    assert_eq!(result.ordered.len(), 1);
    assert!(
        !result.diagnostics.is_empty(),
        "a dangling requires should be diagnosed"
    );
}

#[test]
fn pg_topo_annotation_overrides_inferred_phase() {
    let sqls = vec![
        "-- pg-topo:phase=post_data\nCREATE TABLE t (id int);".to_string(),
    ];
    let labels = vec!["annotated.sql".to_string()];

    let result = analyze_and_sort(&sqls, Some(&labels));

    assert_eq!(result.ordered.len(), 1);
    assert_eq!(result.ordered[0].phase, pgmt::topo::Phase::PostData);
}
