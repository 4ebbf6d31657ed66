//! Postgres book store tests
//!
//! Requires `DATABASE_URL` pointing at a scratch database; the schema is
//! applied and the table emptied before each test. Run with:
//! cargo test --test store_tests -- --ignored --test-threads=1

use libros_server::{
    models::book::{CreateBook, UpdateBook},
    repository::{BookStore, PgBookStore, StoreError},
};
use sqlx::postgres::PgPoolOptions;

async fn store() -> PgBookStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to apply schema");
    sqlx::query("TRUNCATE books")
        .execute(&pool)
        .await
        .expect("Failed to clear books");

    PgBookStore::new(pool)
}

fn new_book(title: &str, author: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: author.to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn create_then_find_round_trips() {
    let store = store().await;

    let created = store.create(&new_book("Libro 1", "Juan Perez")).await.unwrap();
    let found = store
        .find_by_id(&created.id.to_string())
        .await
        .unwrap()
        .expect("book exists");

    assert_eq!(found, created);
}

#[tokio::test]
#[ignore]
async fn find_all_keeps_insertion_order() {
    let store = store().await;

    let first = store.create(&new_book("B", "Autor")).await.unwrap();
    let second = store.create(&new_book("A", "Autor")).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all, vec![first, second]);
}

#[tokio::test]
#[ignore]
async fn create_rejects_empty_fields() {
    let store = store().await;

    let err = store.create(&new_book("", "Juan Perez")).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn update_merges_supplied_fields_and_never_inserts() {
    let store = store().await;
    let created = store.create(&new_book("Libro 1", "Juan Perez")).await.unwrap();

    let updated = store
        .update_by_id(
            &created.id.to_string(),
            &UpdateBook {
                title: Some("Libro Actualizado".into()),
                author: None,
            },
        )
        .await
        .unwrap()
        .expect("book exists");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Libro Actualizado");
    assert_eq!(updated.author, "Juan Perez");

    let missing = uuid::Uuid::new_v4().to_string();
    let none = store
        .update_by_id(&missing, &UpdateBook::default())
        .await
        .unwrap();
    assert!(none.is_none());
    assert_eq!(store.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn delete_returns_snapshot_once() {
    let store = store().await;
    let created = store.create(&new_book("Libro 1", "Juan Perez")).await.unwrap();
    let id = created.id.to_string();

    let deleted = store.delete_by_id(&id).await.unwrap();
    assert_eq!(deleted, Some(created));
    assert!(store.delete_by_id(&id).await.unwrap().is_none());
    assert!(store.find_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn malformed_ids_are_distinct_from_missing() {
    let store = store().await;

    let err = store.find_by_id("99").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(id) if id == "99"));
}
