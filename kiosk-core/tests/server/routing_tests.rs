//! Router tests for the content server
//!
//! Exercised without a listener via tower's `oneshot`:
//! - `/` maps to index.html (404 on an empty root, 200 once written)
//! - path resolution stays inside the content root
//! - non-GET methods and misses are 404
//! - content type derives from the extension

use std::fs;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use kiosk_core::{create_router, ContentStore, ServeState};

fn router_for(root: &std::path::Path) -> axum::Router {
    create_router(ServeState {
        root: root.to_path_buf(),
    })
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_empty_root_serves_404() {
    let temp = TempDir::new().unwrap();
    let app = router_for(temp.path());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_serves_index_html_after_store_write() {
    let temp = TempDir::new().unwrap();
    let store = ContentStore::open(temp.path()).unwrap();
    store.write("index.html", b"<html>kiosk</html>").unwrap();

    let app = router_for(temp.path());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/html"
    );
    assert_eq!(body_bytes(response).await, b"<html>kiosk</html>");
}

#[tokio::test]
async fn test_nested_path_resolves_under_root() {
    let temp = TempDir::new().unwrap();
    let store = ContentStore::open(temp.path()).unwrap();
    store.write("assets/app.js", b"console.log(1)").unwrap();

    let app = router_for(temp.path());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets/app.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/javascript"
    );
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let temp = TempDir::new().unwrap();
    let app = router_for(temp.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_404_and_never_served() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(parent.path().join("secret"), b"top secret").unwrap();

    let app = router_for(&root);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/../secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"Not Found");
}

#[tokio::test]
async fn test_non_get_method_is_404() {
    let temp = TempDir::new().unwrap();
    let store = ContentStore::open(temp.path()).unwrap();
    store.write("index.html", b"x").unwrap();

    let app = router_for(temp.path());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_directory_request_is_404() {
    let temp = TempDir::new().unwrap();
    let store = ContentStore::open(temp.path()).unwrap();
    store.write("assets/app.js", b"x").unwrap();

    let app = router_for(temp.path());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/assets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_extension_is_octet_stream() {
    let temp = TempDir::new().unwrap();
    let store = ContentStore::open(temp.path()).unwrap();
    store.write("data.blob", &[0u8, 1, 2, 3]).unwrap();

    let app = router_for(temp.path());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/data.blob")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/octet-stream"
    );
}
