use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Book, BookPayload};
use super::store::{BookStore, StoreError};

pub(crate) const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id          BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        title       TEXT             NOT NULL,
        author      TEXT             NOT NULL,
        price       DOUBLE PRECISION NOT NULL,
        description TEXT,
        isbn        TEXT             NOT NULL,
        CONSTRAINT books_isbn_key UNIQUE (isbn)
    );
    CREATE INDEX IF NOT EXISTS books_title_idx ON books (title);
    CREATE INDEX IF NOT EXISTS books_author_idx ON books (author);
"#;

const SELECT_BY_ID: &str =
    "SELECT id, title, author, price, description, isbn FROM books WHERE id = $1";

/// `BookStore` backed by the shared Postgres pool.
///
/// Reads borrow one pooled connection; writes run in a transaction that is
/// rolled back on drop unless committed.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A unique violation can only come from `books_isbn_key`.
fn classify(err: sqlx::Error, isbn: &str) -> StoreError {
    let unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        StoreError::DuplicateIsbn(isbn.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, payload: BookPayload) -> Result<Book, StoreError> {
        let isbn = payload.isbn.clone();
        let mut tx = self.pool.begin().await?;

        let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM books WHERE isbn = $1")
            .bind(&isbn)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(StoreError::DuplicateIsbn(isbn));
        }

        // Concurrent creators can both pass the check above; the constraint
        // rejects the loser here.
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO books (title, author, price, description, isbn)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(payload.title)
        .bind(payload.author)
        .bind(payload.price)
        .bind(payload.description)
        .bind(payload.isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, &isbn))?;

        tx.commit().await.map_err(|e| classify(e, &isbn))?;

        self.get(id).await
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Book>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, price, description, isbn
            FROM books
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&mut *conn)
        .await?;

        Ok(books)
    }

    async fn get(&self, id: i64) -> Result<Book, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Book>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, payload: BookPayload) -> Result<Book, StoreError> {
        let isbn = payload.isbn.clone();
        let mut tx = self.pool.begin().await?;

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE books
            SET title = $1, author = $2, price = $3, description = $4, isbn = $5
            WHERE id = $6
            RETURNING id
            "#,
        )
        .bind(payload.title)
        .bind(payload.author)
        .bind(payload.price)
        .bind(payload.description)
        .bind(payload.isbn)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| classify(e, &isbn))?;

        if updated.is_none() {
            return Err(StoreError::NotFound(id));
        }

        tx.commit().await.map_err(|e| classify(e, &isbn))?;

        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }
}
