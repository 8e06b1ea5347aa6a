//! HTTP directory tests against a local axum stub

use std::time::Duration;

use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
use rollcall_directory::{DirectoryError, DirectoryResolver, HttpDirectory};
use tokio::net::TcpListener;

async fn lookup(Path(id): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    match id.as_str() {
        "A1" => Ok(Json(serde_json::json!({ "userId": "A1", "name": "Alice" }))),
        "blank" => Ok(Json(serde_json::json!({ "userId": "blank", "name": "" }))),
        "garbled" => Ok(Json(serde_json::json!("not a record"))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(Json(serde_json::json!({ "name": "Too Late" })))
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

/// Serve the stub directory on an ephemeral port, returning its base URL
async fn spawn_directory() -> String {
    let app = Router::new().route("/users/{id}", get(lookup));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/users")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_resolves_known_badge() {
    let directory = HttpDirectory::new(&spawn_directory().await).unwrap();
    let name = tokio_test::assert_ok!(directory.resolve("A1").await);
    assert_eq!(name, Some("Alice".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_and_blank_badges_are_none() {
    let directory = HttpDirectory::new(&spawn_directory().await).unwrap();
    assert_eq!(directory.resolve("Z9").await.unwrap(), None);
    assert_eq!(directory.resolve("blank").await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_server_error_is_unavailable() {
    let directory = HttpDirectory::new(&spawn_directory().await).unwrap();
    let err = tokio_test::assert_err!(directory.resolve("broken").await);
    assert!(matches!(err, DirectoryError::Unavailable(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_garbled_body_is_invalid_response() {
    let directory = HttpDirectory::new(&spawn_directory().await).unwrap();
    let err = tokio_test::assert_err!(directory.resolve("garbled").await);
    assert!(matches!(err, DirectoryError::InvalidResponse(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_timeout_is_unavailable() {
    let base = spawn_directory().await;
    let directory = HttpDirectory::with_timeout(&base, Duration::from_millis(200)).unwrap();
    let err = tokio_test::assert_err!(directory.resolve("slow").await);
    assert!(matches!(err, DirectoryError::Unavailable(_)));
}

#[tokio::test]
async fn test_unreachable_directory_is_unavailable() {
    // Port 9 (discard) on loopback is closed in test environments
    let directory =
        HttpDirectory::with_timeout("http://127.0.0.1:9/users", Duration::from_millis(500))
            .unwrap();
    let err = tokio_test::assert_err!(directory.resolve("A1").await);
    assert!(matches!(err, DirectoryError::Unavailable(_)));
}
