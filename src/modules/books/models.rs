use serde::{Deserialize, Serialize};

/// Default page size for `GET /books/`.
pub const DEFAULT_LIMIT: u32 = 100;

/// Stored row of the `books` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: Option<String>,
    pub isbn: String,
}

/// Request body for creating a book or replacing all of its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPayload {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Price of the book
    pub price: f64,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unique ISBN number
    pub isbn: String,
}

impl BookPayload {
    /// Stored form of this payload under `id`; every field comes from the payload.
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            description: self.description,
            isbn: self.isbn,
        }
    }
}

/// Outgoing representation of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: Option<String>,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            price: book.price,
            description: book.description,
            isbn: book.isbn,
        }
    }
}

/// Offset pagination for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Number of records to skip
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of records to return
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn description_defaults_to_none() {
        let payload: BookPayload = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "price": 9.99,
            "isbn": "123"
        }))
        .unwrap();
        assert_eq!(payload.description, None);
    }

    #[test]
    fn integer_price_is_accepted() {
        let payload: BookPayload = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "price": 10,
            "isbn": "123"
        }))
        .unwrap();
        assert_eq!(payload.price, 10.0);
    }

    #[test]
    fn missing_or_mistyped_fields_are_rejected() {
        let missing_isbn = json!({"title": "Dune", "author": "Herbert", "price": 9.99});
        assert!(serde_json::from_value::<BookPayload>(missing_isbn).is_err());

        let string_price = json!({
            "title": "Dune",
            "author": "Herbert",
            "price": "cheap",
            "isbn": "123"
        });
        assert!(serde_json::from_value::<BookPayload>(string_price).is_err());
    }

    #[test]
    fn response_serializes_null_description() {
        let response = BookResponse::from(Book {
            id: 7,
            title: "Dune".into(),
            author: "Herbert".into(),
            price: 9.99,
            description: None,
            isbn: "123".into(),
        });
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["id"], 7);
        assert!(value["description"].is_null());
    }

    #[test]
    fn list_params_defaults() {
        let params: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params, ListParams::default());
        assert_eq!(params.limit, 100);
    }
}
