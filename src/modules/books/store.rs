//! Persistence gateway for books.
//!
//! Every call runs in its own scoped session and commits before returning.
//! `isbn` uniqueness is enforced by the store, not by callers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bookstore_http::AppError;
use tokio::sync::RwLock;

use super::models::{Book, BookPayload};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("isbn '{0}' already registered")]
    DuplicateIsbn(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found("Book not found"),
            StoreError::DuplicateIsbn(_) => AppError::bad_request("ISBN already registered")
                .with_code("isbn_already_registered"),
            StoreError::Database(e) => {
                AppError::Internal(anyhow::Error::new(e).context("book store failure"))
            }
        }
    }
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book and return the stored row with its assigned id.
    async fn create(&self, payload: BookPayload) -> Result<Book, StoreError>;

    /// Books in ascending id order, `skip` rows in, at most `limit` rows.
    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: i64) -> Result<Book, StoreError>;

    /// Overwrite every field of an existing book.
    async fn update(&self, id: i64, payload: BookPayload) -> Result<Book, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// In-process store with the same invariants as the `books` table.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

impl MemoryInner {
    fn isbn_taken(&self, isbn: &str, except: Option<i64>) -> bool {
        self.books
            .values()
            .any(|book| book.isbn == isbn && Some(book.id) != except)
    }
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, payload: BookPayload) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.isbn_taken(&payload.isbn, None) {
            return Err(StoreError::DuplicateIsbn(payload.isbn));
        }

        inner.last_id += 1;
        let book = payload.into_book(inner.last_id);
        inner.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Book>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Book, StoreError> {
        let inner = self.inner.read().await;
        inner.books.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, payload: BookPayload) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.books.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if inner.isbn_taken(&payload.isbn, Some(id)) {
            return Err(StoreError::DuplicateIsbn(payload.isbn));
        }

        let book = payload.into_book(id);
        inner.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload(title: &str, isbn: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            author: "Herbert".to_string(),
            price: 9.99,
            description: Some("desert planet".to_string()),
            isbn: isbn.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let store = MemoryBookStore::new();
        let first = store.create(payload("Dune", "1")).await.unwrap();
        let second = store.create(payload("Messiah", "2")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryBookStore::new();
        let first = store.create(payload("Dune", "1")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(payload("Dune", "1")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected_on_create() {
        let store = MemoryBookStore::new();
        store.create(payload("Dune", "123")).await.unwrap();

        let err = store.create(payload("Other", "123")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIsbn(isbn) if isbn == "123"));
        assert_eq!(store.list(0, 100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_may_keep_own_isbn_but_not_take_another() {
        let store = MemoryBookStore::new();
        let dune = store.create(payload("Dune", "1")).await.unwrap();
        store.create(payload("Messiah", "2")).await.unwrap();

        let renamed = store
            .update(dune.id, payload("Dune (2nd ed)", "1"))
            .await
            .unwrap();
        assert_eq!(renamed.title, "Dune (2nd ed)");

        let err = store.update(dune.id, payload("Dune", "2")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIsbn(_)));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryBookStore::new();
        assert!(matches!(store.get(9).await, Err(StoreError::NotFound(9))));
        assert!(matches!(
            store.update(9, payload("Dune", "1")).await,
            Err(StoreError::NotFound(9))
        ));
        assert!(matches!(store.delete(9).await, Err(StoreError::NotFound(9))));
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_isbn_keep_one_row() {
        let store = Arc::new(MemoryBookStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(payload(&format!("copy {i}"), "dup")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::DuplicateIsbn(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.list(0, 100).await.unwrap().len(), 1);
    }

    #[test]
    fn store_errors_map_to_client_errors() {
        use axum::http::StatusCode;

        assert_eq!(
            AppError::from(StoreError::NotFound(1)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::DuplicateIsbn("1".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
