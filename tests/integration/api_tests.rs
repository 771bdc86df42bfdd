//! HTTP API tests through the Axum router.
//!
//! Tests verify:
//! - Envelope translation into status codes, headers and bodies
//! - GET and POST routing
//! - The raw invocation endpoint returning the envelope itself
//! - CORS preflight
//! - Panics inside handlers answered with a 500 envelope

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use story_store::{create_router, RouterConfig};

use super::test_utils::{default_state, MemoryStore};

fn router() -> (Router, std::sync::Arc<MemoryStore>) {
    let (state, store, _) = default_state();
    (
        create_router(state, RouterConfig::default().with_tracing(false)),
        store,
    )
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (router, _) = router();

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_save_then_load_over_http() {
    let (router, _) = router();

    let response = router
        .clone()
        .oneshot(post("/save", json!({"name": "My Story", "story": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    assert_eq!(json_body(response).await["filename"], "My_Story.txt");

    let response = router
        .oneshot(post("/load", json!({"filename": "My_Story.txt"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["content"], "Hello");
}

#[tokio::test]
async fn test_list_via_get() {
    let (router, store) = router();
    store.insert("a.txt", "a", "text/plain").await;
    store.insert("a-canvas.png", vec![1u8, 2, 3], "image/png").await;

    let response = router
        .oneshot(Request::builder().uri("/list").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["stories"].as_array().unwrap().len(), 1);
    assert_eq!(body["stories"][0]["filename"], "a.txt");
}

#[tokio::test]
async fn test_error_statuses_over_http() {
    let (router, _) = router();

    let response = router
        .clone()
        .oneshot(post("/delete", json!({"filename": "missing.txt"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "File not found"}));

    let response = router
        .clone()
        .oneshot(post("/imagegenerator", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/canvas")
                .body(Body::from("{broken"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_generate_over_http() {
    let (router, _) = router();

    let response = router
        .oneshot(post("/imagegenerator", json!({"text": "A tiny dragon"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["imageUrl"]
        .as_str()
        .unwrap()
        .contains("X-Amz-Expires=3600"));
}

#[tokio::test]
async fn test_invocation_returns_envelope() {
    let (router, store) = router();

    let event = json!({
        "body": json!({"name": "Tale", "content": "text"}).to_string(),
        "httpMethod": "POST"
    });
    let response = router
        .clone()
        .oneshot(post("/functions/save/invocations", event))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let envelope = json_body(response).await;
    assert_eq!(envelope["statusCode"], 200);
    assert_eq!(envelope["headers"]["Access-Control-Allow-Origin"], "*");

    let body: Value = serde_json::from_str(envelope["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["filename"], "Tale.txt");
    assert!(store.object("Tale.txt").await.is_some());

    // Handler failures stay inside the envelope
    let response = router
        .oneshot(post(
            "/functions/delete/invocations",
            json!({"filename": "nope.txt"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["statusCode"], 404);
}

#[tokio::test]
async fn test_invocation_unknown_function() {
    let (router, _) = router();

    let response = router
        .oneshot(post("/functions/writersblock/invocations", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"],
        "Unknown function: writersblock"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let (router, _) = router();

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/save")
                .header("origin", "https://stories.example.com")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_delete_method_on_delete_route() {
    let (router, store) = router();
    store.insert("Tale.txt", "text", "text/plain").await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/delete")
        .header("content-type", "application/json")
        .body(Body::from(json!({"filename": "Tale.txt"}).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Story deleted successfully", "filename": "Tale.txt"})
    );
    assert!(store.object("Tale.txt").await.is_none());
}

#[tokio::test]
async fn test_cors_preflight_allows_delete() {
    let (router, _) = router();

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/delete")
                .header("origin", "https://stories.example.com")
                .header("access-control-request-method", "DELETE")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("DELETE"), "allowed methods: {}", allowed);
}

#[tokio::test]
async fn test_handler_panic_becomes_500_envelope() {
    let (router, store) = router();
    store.insert("Tale.txt", "text", "text/plain").await;
    store.panic_on_read();

    let response = router
        .oneshot(post("/load", json!({"filename": "Tale.txt"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    let body = json_body(response).await;
    assert_eq!(body["error"], "simulated backend crash reading Tale.txt");
}
