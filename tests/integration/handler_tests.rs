//! Handler tests run directly against `dispatch`, without HTTP.
//!
//! Tests verify:
//! - Save key derivation, content types and base64 handling
//! - Load round trips for stories and canvases
//! - Delete existence checks
//! - List filtering
//! - Uniform envelope shape for successes and failures

use serde_json::{json, Value};

use story_store::server::{dispatch, Envelope, HandlerKind};

use super::test_utils::{default_state, StoreCall, PNG_BASE64};

fn body(envelope: &Envelope) -> Value {
    envelope.body_json().expect("envelope body should be JSON")
}

fn wrapped(payload: Value) -> Value {
    json!({ "body": payload.to_string() })
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn test_save_story_derives_key() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "My Story", "content": "Once upon a time"}),
    )
    .await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");

    let body = body(&envelope);
    assert_eq!(body["filename"], "My_Story.txt");
    assert_eq!(body["fileName"], "My_Story.txt");
    assert_eq!(body["file_name"], "My_Story.txt");
    assert_eq!(body["message"], "Story saved successfully");

    let object = store.object("My_Story.txt").await.unwrap();
    assert_eq!(object.data.as_ref(), b"Once upon a time");
    assert_eq!(object.content_type, "text/plain");
}

#[tokio::test]
async fn test_save_accepts_frontend_aliases() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        wrapped(json!({"storyName": "Tale", "story": "text"})),
    )
    .await;

    assert_eq!(envelope.status_code, 200);
    assert!(store.object("Tale.txt").await.is_some());
}

#[tokio::test]
async fn test_save_character_is_text() {
    let (state, store, _) = default_state();

    let sheet = json!({"name": "Ada", "age": "30"}).to_string();
    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Tale-Ada-character", "story": sheet}),
    )
    .await;

    assert_eq!(body(&envelope)["filename"], "Tale-Ada-character.txt");
    let object = store.object("Tale-Ada-character.txt").await.unwrap();
    assert_eq!(object.content_type, "text/plain");
    assert_eq!(object.data.as_ref(), sheet.as_bytes());
}

#[tokio::test]
async fn test_save_missing_fields() {
    let (state, store, _) = default_state();

    for event in [
        json!({}),
        json!({"name": "x"}),
        json!({"content": "x"}),
        json!({"name": "", "content": "x"}),
    ] {
        let envelope = dispatch(&state, HandlerKind::Save, event).await;
        assert_eq!(envelope.status_code, 400);
        assert_eq!(
            body(&envelope)["error"],
            "Story name and content are required"
        );
    }

    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_numeric_canvas_flag() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Sketch", "content": PNG_BASE64, "isCanvas": 1}),
    )
    .await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(body(&envelope)["filename"], "Sketch.png");
    assert_eq!(store.object("Sketch.png").await.unwrap().content_type, "image/png");
}

#[tokio::test]
async fn test_canvas_round_trip() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Tale", "content": PNG_BASE64, "isCanvas": true}),
    )
    .await;
    assert_eq!(envelope.status_code, 200);
    assert_eq!(body(&envelope)["filename"], "Tale.png");

    let object = store.object("Tale.png").await.unwrap();
    assert_eq!(object.content_type, "image/png");
    assert_eq!(&object.data[1..4], b"PNG");

    let envelope = dispatch(
        &state,
        HandlerKind::LoadCanvas,
        json!({"filename": "Tale.png"}),
    )
    .await;
    assert_eq!(envelope.status_code, 200);
    assert_eq!(body(&envelope)["imageData"], PNG_BASE64);
}

#[tokio::test]
async fn test_canvas_detected_by_name() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Tale-Canvas", "content": PNG_BASE64}),
    )
    .await;

    assert_eq!(body(&envelope)["filename"], "Tale-Canvas.png");
    assert_eq!(
        store.object("Tale-Canvas.png").await.unwrap().content_type,
        "image/png"
    );
}

#[tokio::test]
async fn test_save_invalid_base64_writes_nothing() {
    let (state, store, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Tale", "content": "not base64!!", "isCanvas": true}),
    )
    .await;

    assert_eq!(envelope.status_code, 400);
    let error = body(&envelope)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid base64 data"), "got: {}", error);

    assert!(store.keys().await.is_empty());
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_save_last_write_wins_on_collision() {
    let (state, store, _) = default_state();

    dispatch(&state, HandlerKind::Save, json!({"name": "a b", "content": "first"})).await;
    dispatch(&state, HandlerKind::Save, json!({"name": "a?b", "content": "second"})).await;

    assert_eq!(store.keys().await, vec!["a_b.txt".to_string()]);
    assert_eq!(store.object("a_b.txt").await.unwrap().data.as_ref(), b"second");
}

#[tokio::test]
async fn test_save_store_failure_is_500() {
    let (state, store, _) = default_state();
    store.fail_writes();

    let envelope = dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "Tale", "content": "text"}),
    )
    .await;

    assert_eq!(envelope.status_code, 500);
    assert_eq!(
        body(&envelope)["error"],
        "S3 error: simulated write failure"
    );
}

// =============================================================================
// Load
// =============================================================================

#[tokio::test]
async fn test_story_round_trip() {
    let (state, _, _) = default_state();

    dispatch(
        &state,
        HandlerKind::Save,
        json!({"name": "My Story", "content": "<p>Hello, wörld</p>"}),
    )
    .await;

    let envelope = dispatch(
        &state,
        HandlerKind::LoadStory,
        wrapped(json!({"filename": "My_Story.txt"})),
    )
    .await;

    assert_eq!(envelope.status_code, 200);
    let body = body(&envelope);
    assert_eq!(body["content"], "<p>Hello, wörld</p>");
    assert_eq!(body["filename"], "My_Story.txt");
}

#[tokio::test]
async fn test_load_missing_filename() {
    let (state, _, _) = default_state();

    for kind in [HandlerKind::LoadCanvas, HandlerKind::LoadStory, HandlerKind::Delete] {
        let envelope = dispatch(&state, kind, json!({})).await;
        assert_eq!(envelope.status_code, 400);
        assert_eq!(body(&envelope)["error"], "filename required");
    }
}

#[tokio::test]
async fn test_load_canvas_not_found() {
    let (state, _, _) = default_state();

    let envelope = dispatch(
        &state,
        HandlerKind::LoadCanvas,
        json!({"filename": "missing.png"}),
    )
    .await;

    assert_eq!(envelope.status_code, 404);
    assert_eq!(body(&envelope)["error"], "Canvas not found");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_existing() {
    let (state, store, _) = default_state();
    store.insert("Tale.txt", "text", "text/plain").await;

    let envelope = dispatch(&state, HandlerKind::Delete, json!({"filename": "Tale.txt"})).await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(
        body(&envelope),
        json!({"message": "Story deleted successfully", "filename": "Tale.txt"})
    );
    assert!(store.object("Tale.txt").await.is_none());
    assert_eq!(
        store.calls().await,
        vec![
            StoreCall::Head("Tale.txt".to_string()),
            StoreCall::Delete("Tale.txt".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_delete_absent_skips_delete_call() {
    let (state, store, _) = default_state();

    let envelope = dispatch(&state, HandlerKind::Delete, json!({"filename": "gone.txt"})).await;

    assert_eq!(envelope.status_code, 404);
    assert_eq!(body(&envelope)["error"], "File not found");
    assert_eq!(
        store.calls().await,
        vec![StoreCall::Head("gone.txt".to_string())]
    );
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_only_text_files() {
    let (state, store, _) = default_state();
    store.insert("b.txt", "bb", "text/plain").await;
    store.insert("a.txt", "a", "text/plain").await;
    store.insert("a-canvas.png", vec![0u8; 10], "image/png").await;
    store.insert("generated-abc.png", vec![0u8; 10], "image/png").await;

    let envelope = dispatch(&state, HandlerKind::List, json!({})).await;
    assert_eq!(envelope.status_code, 200);

    let body = body(&envelope);
    let stories = body["stories"].as_array().unwrap();
    assert_eq!(stories.len(), 2);
    assert_eq!(stories[0]["filename"], "a.txt");
    assert_eq!(stories[0]["size"], 1);
    assert_eq!(stories[0]["lastModified"], "2024-01-15T10:30:00Z");
    assert_eq!(stories[1]["filename"], "b.txt");
}

#[tokio::test]
async fn test_list_empty_bucket() {
    let (state, _, _) = default_state();

    let envelope = dispatch(&state, HandlerKind::List, json!(null)).await;
    assert_eq!(envelope.status_code, 200);
    assert_eq!(body(&envelope), json!({"stories": []}));
}

// =============================================================================
// Input Shapes
// =============================================================================

#[tokio::test]
async fn test_wrapped_and_flat_shapes_agree() {
    let (flat_state, flat_store, _) = default_state();
    let (wrapped_state, wrapped_store, _) = default_state();
    let payload = json!({"name": "Same Name", "content": "same"});

    let flat = dispatch(&flat_state, HandlerKind::Save, payload.clone()).await;
    let wrapped = dispatch(&wrapped_state, HandlerKind::Save, wrapped(payload)).await;

    assert_eq!(flat, wrapped);
    assert_eq!(flat_store.keys().await, wrapped_store.keys().await);
}

#[tokio::test]
async fn test_malformed_wrapped_body() {
    let (state, _, _) = default_state();

    let envelope = dispatch(&state, HandlerKind::Save, json!({"body": "{oops"})).await;

    assert_eq!(envelope.status_code, 400);
    assert!(body(&envelope)["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid JSON body"));
}
