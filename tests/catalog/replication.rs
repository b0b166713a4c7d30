use crate::helpers::harness::with_test_db;
use anyhow::Result;
use pgmt::catalog::replication::{fetch_publications, fetch_subscriptions};

#[tokio::test]
async fn test_fetch_publication_for_all_tables() -> Result<()> {
    with_test_db(async |db| {
        db.execute("CREATE TABLE orders (id int PRIMARY KEY)").await;
        db.execute("CREATE PUBLICATION all_pub FOR ALL TABLES").await;

        let publications = fetch_publications(&mut *db.conn().await).await?;
        let pub_ = publications
            .iter()
            .find(|p| p.name == "all_pub")
            .expect("publication should be found");

        assert!(pub_.all_tables);
        assert!(pub_.publish_insert);
        assert!(pub_.publish_update);
        assert!(pub_.publish_delete);
        assert!(pub_.tables.is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_fetch_publication_for_specific_tables() -> Result<()> {
    with_test_db(async |db| {
        db.execute("CREATE TABLE orders (id int PRIMARY KEY)").await;
        db.execute(
            "CREATE PUBLICATION orders_pub FOR TABLE orders WITH (publish = 'insert, update')",
        )
        .await;

        let publications = fetch_publications(&mut *db.conn().await).await?;
        let pub_ = publications
            .iter()
            .find(|p| p.name == "orders_pub")
            .expect("publication should be found");

        assert!(!pub_.all_tables);
        assert!(pub_.publish_insert);
        assert!(pub_.publish_update);
        assert!(!pub_.publish_delete);
        assert!(!pub_.publish_truncate);
        assert_eq!(
            pub_.tables,
            vec![("public".to_string(), "orders".to_string())]
        );

        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_fetch_subscriptions_does_not_error_without_privilege() -> Result<()> {
    with_test_db(async |db| {
        // pg_subscription is cluster-wide; fetching must never fail even when
        // no subscriptions exist in this isolated test database.
        let subscriptions = fetch_subscriptions(&mut *db.conn().await).await?;
        assert!(subscriptions.iter().all(|s| s.conninfo.is_empty()
            || s.conninfo.iter().all(|e| e.value.starts_with("__CONN_"))));

        Ok(())
    })
    .await
}
