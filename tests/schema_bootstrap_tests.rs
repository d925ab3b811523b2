use jewelstore::{
    models::{NewCatalogItem, PawnRequest, PawnStatus, Profile},
    repositories::{
        CatalogRepository, PgCatalogRepository, PgSchemaRepository, RepositoryError,
        SchemaRepository,
    },
    schema::{self, POLICIES},
    services::SchemaService,
    test_utils::test_helpers,
};
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;

macro_rules! bootstrapped_conn {
    () => {
        match test_helpers::create_bootstrapped_db().await.unwrap() {
            Some(conn) => conn,
            None => {
                eprintln!("TEST_DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

#[tokio::test]
#[serial]
async fn test_bootstrap_produces_complete_schema() {
    let conn = bootstrapped_conn!();
    let service = SchemaService::new(Arc::new(PgSchemaRepository::new(conn)));

    let status = service.status().await.unwrap();
    assert!(status.is_complete(), "incomplete schema: {:?}", status);
}

#[tokio::test]
#[serial]
async fn test_bootstrap_rerun_creates_no_duplicates() {
    let conn = bootstrapped_conn!();
    let repository = Arc::new(PgSchemaRepository::new(conn.clone()));
    let service = SchemaService::new(repository.clone());

    for _ in 0..3 {
        let applied = service.apply_bootstrap().await.unwrap();
        assert_eq!(applied, schema::bootstrap_statements().len());
    }

    let status = service.status().await.unwrap();
    assert!(status.is_complete());
    assert_eq!(status.trigger_count, 1);
    assert_eq!(status.tables.len(), schema::TABLES.len());

    let ours: Vec<_> = repository
        .existing_policies()
        .await
        .unwrap()
        .into_iter()
        .filter(|(table, name)| POLICIES.iter().any(|p| p.table == table && p.name == name))
        .collect();
    assert_eq!(ours.len(), POLICIES.len());
}

#[tokio::test]
#[serial]
async fn test_new_auth_user_gets_profile() {
    let conn = bootstrapped_conn!();

    let id = test_helpers::insert_auth_user(&conn, "ada@example.com", Some("Ada Lovelace"))
        .await
        .unwrap();

    let profile: Profile = sqlx::query_as(
        "SELECT id, email, full_name, created_at, updated_at FROM public.profiles WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&mut *conn.lock().await.unwrap())
    .await
    .unwrap();

    assert_eq!(profile.id, id);
    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
#[serial]
async fn test_deleting_auth_user_cascades_to_profile() {
    let conn = bootstrapped_conn!();

    let id = test_helpers::insert_auth_user(&conn, "gone@example.com", None)
        .await
        .unwrap();
    assert_eq!(test_helpers::count_rows(&conn, "public.profiles").await.unwrap(), 1);

    sqlx::query("DELETE FROM auth.users WHERE id = $1")
        .bind(id)
        .execute(&mut *conn.lock().await.unwrap())
        .await
        .unwrap();

    assert_eq!(test_helpers::count_rows(&conn, "public.profiles").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_negative_price_is_rejected_by_store() {
    let conn = bootstrapped_conn!();
    let repository = PgCatalogRepository::new(conn.clone());

    // Skip client-side validation and go straight to the store.
    let item = NewCatalogItem {
        name: "Broken Ring".to_string(),
        description: "Negative price".to_string(),
        price: Decimal::new(-100, 2),
        category: "Rings".to_string(),
        image_url: "https://example.com/broken.jpg".to_string(),
    };

    let result = repository.insert_item(&item).await;
    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    assert_eq!(repository.count_items().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_pawn_request_status_is_constrained() {
    let conn = bootstrapped_conn!();
    let user_id = test_helpers::insert_auth_user(&conn, "pawn@example.com", None)
        .await
        .unwrap();

    let insert = |status: &'static str| {
        sqlx::query(
            r#"
            INSERT INTO public.pawn_requests (user_id, item_description, requested_amount, status)
            VALUES ($1, 'Gold chain', 150.00, $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
    };

    for status in PawnStatus::ALL {
        insert(status.as_str())
            .execute(&mut *conn.lock().await.unwrap())
            .await
            .unwrap();
    }

    let err = insert("cancelled")
        .execute(&mut *conn.lock().await.unwrap())
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert!(db_err.is_check_violation());
}

#[tokio::test]
#[serial]
async fn test_pawn_request_defaults_to_pending() {
    let conn = bootstrapped_conn!();
    let user_id = test_helpers::insert_auth_user(&conn, "default@example.com", None)
        .await
        .unwrap();

    let request: PawnRequest = sqlx::query_as(
        r#"
        INSERT INTO public.pawn_requests (user_id, item_description, requested_amount)
        VALUES ($1, 'Silver watch', 80.00)
        RETURNING id, user_id, item_description, requested_amount, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *conn.lock().await.unwrap())
    .await
    .unwrap();

    assert_eq!(request.user_id, user_id);
    assert_eq!(request.status, PawnStatus::Pending);
    assert_eq!(request.requested_amount, Decimal::new(8000, 2));
}
