use sqlx::PgPool;

/// Connect, migrate and check the seed category the films default relies on.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    filmhub_db::health_check(&pool).await.unwrap();

    let seed: (i64, String) = sqlx::query_as("SELECT id, slug FROM categories WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(seed, (1, "uncategorized".to_string()));
}

/// Every mutable table carries an `updated_at` trigger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_triggers_exist(pool: PgPool) {
    for table in ["users", "categories", "films"] {
        let found: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.triggers
             WHERE event_object_table = $1 AND trigger_name = $2",
        )
        .bind(table)
        .bind(format!("trg_{table}_updated_at"))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(found.0 > 0, "{table} is missing its updated_at trigger");
    }
}
