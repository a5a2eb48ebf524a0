//! HTTP handlers for the books collection.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, MethodRouter},
    Json, Router,
};
use bookstore_http::{AppError, ValidJson, ValidPath, ValidQuery};

use super::models::{BookPayload, BookResponse, ListParams, MessageResponse};
use super::store::BookStore;

#[derive(Clone)]
pub struct BooksState {
    store: Arc<dyn BookStore>,
}

/// Routes for `/books` backed by `store`.
pub fn router(store: Arc<dyn BookStore>) -> Router {
    let collection: MethodRouter<BooksState> = get(list_books).post(create_book);

    Router::new()
        .route("/books", collection.clone())
        .route("/books/", collection)
        .route(
            "/books/{book_id}",
            get(read_book).put(update_book).delete(delete_book),
        )
        .with_state(BooksState { store })
}

async fn create_book(
    State(state): State<BooksState>,
    ValidJson(payload): ValidJson<BookPayload>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book = state.store.create(payload).await?;
    tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(book.into())))
}

async fn list_books(
    State(state): State<BooksState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let books = state.store.list(params.skip, params.limit).await?;
    tracing::debug!(
        skip = params.skip,
        limit = params.limit,
        returned = books.len(),
        "books listed"
    );
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

async fn read_book(
    State(state): State<BooksState>,
    ValidPath(book_id): ValidPath<i64>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state.store.get(book_id).await?;
    Ok(Json(book.into()))
}

async fn update_book(
    State(state): State<BooksState>,
    ValidPath(book_id): ValidPath<i64>,
    ValidJson(payload): ValidJson<BookPayload>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state.store.update(book_id, payload).await?;
    tracing::info!(book_id, isbn = %book.isbn, "book updated");
    Ok(Json(book.into()))
}

async fn delete_book(
    State(state): State<BooksState>,
    ValidPath(book_id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete(book_id).await?;
    tracing::info!(book_id, "book deleted");
    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
