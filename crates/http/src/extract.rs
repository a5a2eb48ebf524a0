//! Extractors that turn axum rejections into [`AppError::Validation`]
//!
//! Input is validated before any handler body runs, so a malformed request
//! never reaches the persistence layer.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// JSON body extractor with structured validation errors
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

/// Query string extractor with structured validation errors
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

/// Path parameter extractor with structured validation errors
#[derive(Debug, Clone, Copy)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| reject("body", rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| reject("query", rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| reject("path", rejection.body_text()))?;
        Ok(Self(value))
    }
}

fn reject(location: &str, text: String) -> AppError {
    let mut detail = json!({ "location": location, "error": text });
    if let Some(field) = field_name(&text) {
        detail["field"] = json!(field);
    }
    AppError::validation(vec![detail], format!("invalid request {location}"))
}

/// Best-effort field name from a serde message such as
/// "missing field `isbn`" or "price: invalid type: string ...".
fn field_name(text: &str) -> Option<&str> {
    if let Some(start) = text.find("missing field `") {
        let rest = &text[start + "missing field `".len()..];
        return rest.find('`').map(|end| &rest[..end]);
    }
    let (_, tail) = text.split_once(": ")?;
    let (path, _) = tail.split_once(": ")?;
    let path = path.trim();
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']');
    is_path.then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_extracted() {
        let text = "Failed to deserialize the JSON body into the target type: missing field `isbn` at line 1 column 12";
        assert_eq!(field_name(text), Some("isbn"));
    }

    #[test]
    fn invalid_type_path_is_extracted() {
        let text = "Failed to deserialize the JSON body into the target type: price: invalid type: string \"x\", expected f64 at line 1 column 14";
        assert_eq!(field_name(text), Some("price"));
    }

    #[test]
    fn unrelated_message_has_no_field() {
        assert_eq!(
            field_name("Expected request with `Content-Type: application/json`"),
            None
        );
    }

    #[test]
    fn rejection_is_validation_error() {
        let err = reject(
            "query",
            "Failed to deserialize query string: limit: invalid digit found in string".to_string(),
        );
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details[0]["location"], "query");
                assert_eq!(details[0]["field"], "limit");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
