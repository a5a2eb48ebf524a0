//! Full application router wiring, without touching the database.

use std::collections::HashMap;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bookstore_kernel::{settings::Settings, InitCtx};
use tower::ServiceExt;

fn settings(base_path: Option<&str>) -> Settings {
    let mut vars: HashMap<String, String> = [
        ("BOOKSTORE_CONFIG_DIR", "/nonexistent/bookstore-config"),
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", "5432"),
        ("DB_NAME", "api_bookstore"),
        ("DB_USER", "postgres"),
        ("DB_PASSWORD", "postgres"),
        ("SECRET_KEY", "test-secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    if let Some(base_path) = base_path {
        vars.insert("BOOKSTORE__SERVER__BASE_PATH".into(), base_path.into());
    }
    Settings::from_vars(&vars).unwrap()
}

async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
}

#[tokio::test]
async fn registry_contributes_books_migration() {
    let registry = bookstore_app::build_registry();
    let migrations = registry.collect_migrations();

    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].0, "books");
    assert_eq!(migrations[0].1.id, "001_create_books");
    assert!(migrations[0].1.up.contains("UNIQUE (isbn)"));
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let settings = settings(None);
    let pool = bookstore_db::pool::connect_lazy(&settings.database);
    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    let registry = bookstore_app::build_registry();
    let router = bookstore_http::build_router(&registry, &ctx);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, spec) = get_json(router.clone(), "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/books/"]["post"].is_object());
    assert!(spec["paths"]["/books/{book_id}"]["delete"].is_object());
    assert_eq!(spec["tags"][0]["name"], "books");

    let (status, swagger) = get_json(router, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(swagger["paths"]["/books/"]["get"].is_object());
    assert!(swagger["paths"]["/books/"]["post"].is_object());
    assert!(swagger["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn base_path_prefixes_openapi_paths() {
    let settings = settings(Some("/api/v1"));
    let pool = bookstore_db::pool::connect_lazy(&settings.database);
    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    let registry = bookstore_app::build_registry();
    let router = bookstore_http::build_router(&registry, &ctx);

    let (_, spec) = get_json(router, "/docs/openapi.json").await;
    assert!(spec["paths"]["/api/v1/books/{book_id}"].is_object());
    assert!(spec["paths"]["/books/{book_id}"].is_null());
}
