use super::*;
use crate::config::StoreFormat;
use crate::tasks::TaskQueue;
use crate::types::TaskDomain;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use tower::ServiceExt;


/// Config pointing the metadata store at `path`
fn test_config(path: &Path) -> Config {
    let mut config = Config::default();
    config.metadata.path = path.to_path_buf();
    config.metadata.format = Some(StoreFormat::from_path(path));
    config
}

/// Router with one queue registered for the upload domain
fn test_app(metadata_path: &Path) -> (Router, Arc<TaskQueue>) {
    let queue = Arc::new(TaskQueue::new());
    let tasks = Arc::new(TaskRegistry::new().register(TaskDomain::Upload, queue.clone()));
    let app = create_router(tasks, Arc::new(test_config(metadata_path)));
    (app, queue)
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir.path().join("metadata.csv"));
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let tasks = Arc::new(TaskRegistry::new());
    let api_handle = tokio::spawn(async move { start_api_server(tasks, config).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");

    api_handle.abort();
}

#[tokio::test]
async fn test_serve_with_shutdown_stops_on_signal() {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir.path().join("metadata.csv"));
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let token = tokio_util::sync::CancellationToken::new();
    let handle = tokio::spawn(serve_with_shutdown(
        Arc::new(TaskRegistry::new()),
        Arc::new(config),
        token.clone().cancelled_owned(),
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let dir = tempdir().unwrap();
    let (app, _queue) = test_app(&dir.path().join("metadata.csv"));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir.path().join("metadata.csv"));
    config.api.cors_enabled = false;

    let app = create_router(Arc::new(TaskRegistry::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be absent when CORS is disabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let dir = tempdir().unwrap();
    let mut config = test_config(&dir.path().join("metadata.csv"));
    config.api.cors_origins = vec!["http://allowed.example".to_string()];

    let app = create_router(Arc::new(TaskRegistry::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://allowed.example")
    );
}
