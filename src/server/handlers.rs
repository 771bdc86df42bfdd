//! Request handlers for the story store.
//!
//! Each handler takes normalized [`RequestFields`], talks to the object store
//! (directly or through the generation pipeline) and produces an [`Envelope`].
//! Failures never escape a handler: they become an error envelope.
//!
//! # Endpoints
//!
//! - `POST /save` - Save a story, character sheet or canvas
//! - `POST /canvas` - Load a canvas as base64
//! - `POST /load` - Load a story's text
//! - `GET /list` - List stories
//! - `POST /delete` - Delete a stored file
//! - `POST /imagegenerator` - Generate an illustration
//! - `POST /functions/{name}/invocations` - Raw event invocation
//! - `GET /health` - Health check

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{ServiceError, StoreError};
use crate::generate::{GenerationPipeline, ImageModel};
use crate::naming::{derive_key, resolve_content_type};
use crate::store::ObjectStore;

use super::envelope::{Envelope, RequestFields};

// =============================================================================
// Application State
// =============================================================================

/// Shared, read-only application state.
pub struct AppState<S: ObjectStore, M: ImageModel> {
    /// Object store for all stored assets
    pub store: Arc<S>,

    /// Illustration pipeline, writing into the same store
    pub pipeline: Arc<GenerationPipeline<S, M>>,
}

impl<S: ObjectStore, M: ImageModel> AppState<S, M> {
    /// Create state from a store and a pipeline built on the same store.
    pub fn new(store: Arc<S>, pipeline: GenerationPipeline<S, M>) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
        }
    }
}

impl<S: ObjectStore, M: ImageModel> Clone for AppState<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

// =============================================================================
// Handler Dispatch
// =============================================================================

/// The independent entry points of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Save,
    LoadCanvas,
    LoadStory,
    List,
    Delete,
    Generate,
}

impl HandlerKind {
    /// Canonical function name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Save => "save",
            HandlerKind::LoadCanvas => "canvas",
            HandlerKind::LoadStory => "load",
            HandlerKind::List => "list",
            HandlerKind::Delete => "delete",
            HandlerKind::Generate => "imagegenerator",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save" => Ok(HandlerKind::Save),
            "canvas" | "load-canvas" => Ok(HandlerKind::LoadCanvas),
            "load" | "load-story" => Ok(HandlerKind::LoadStory),
            "list" => Ok(HandlerKind::List),
            "delete" => Ok(HandlerKind::Delete),
            "imagegenerator" | "generate" => Ok(HandlerKind::Generate),
            other => Err(ServiceError::NotFound(format!("Unknown function: {}", other))),
        }
    }
}

/// Run one handler against already-normalized fields.
pub async fn handle<S, M>(
    state: &AppState<S, M>,
    kind: HandlerKind,
    fields: &RequestFields,
) -> Envelope
where
    S: ObjectStore,
    M: ImageModel,
{
    let envelope: Envelope = match kind {
        HandlerKind::Save => save_story(state, fields).await.into(),
        HandlerKind::LoadCanvas => load_canvas(state, fields).await.into(),
        HandlerKind::LoadStory => load_story(state, fields).await.into(),
        HandlerKind::List => list_stories(state).await.into(),
        HandlerKind::Delete => delete_story(state, fields).await.into(),
        HandlerKind::Generate => generate_image(state, fields).await.into(),
    };

    debug!(handler = %kind, status = envelope.status_code, "request handled");
    envelope
}

/// Normalize a raw event and run one handler.
pub async fn dispatch<S, M>(state: &AppState<S, M>, kind: HandlerKind, event: Value) -> Envelope
where
    S: ObjectStore,
    M: ImageModel,
{
    match RequestFields::from_event(event) {
        Ok(fields) => handle(state, kind, &fields).await,
        Err(err) => Envelope::from_error(&err),
    }
}

async fn dispatch_bytes<S, M>(state: &AppState<S, M>, kind: HandlerKind, body: &[u8]) -> Envelope
where
    S: ObjectStore,
    M: ImageModel,
{
    match RequestFields::from_slice(body) {
        Ok(fields) => handle(state, kind, &fields).await,
        Err(err) => Envelope::from_error(&err),
    }
}

/// Map a missing key to a 404 with a handler-specific message.
fn missing_as(message: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
    move |err| match err {
        StoreError::NotFound(_) => ServiceError::NotFound(message.to_string()),
        other => ServiceError::Store(other),
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Body of a successful save.
///
/// The key is repeated under three spellings because existing clients read
/// different ones.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
    pub filename: String,
    #[serde(rename = "fileName")]
    pub file_name_camel: String,
    #[serde(rename = "file_name")]
    pub file_name_snake: String,
}

impl SaveResponse {
    fn new(key: String) -> Self {
        Self {
            message: "Story saved successfully".to_string(),
            filename: key.clone(),
            file_name_camel: key.clone(),
            file_name_snake: key,
        }
    }
}

/// One story in a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub filename: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Body of the list endpoint.
#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<StorySummary>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Save a story, character sheet or canvas.
///
/// Fields: `name` (or `storyName`), `content` (or `story` / `storyContent`),
/// optional `isCanvas`. Canvas content must be base64; it is decoded before
/// anything is written, so a bad payload leaves the store untouched.
pub async fn save_story<S, M>(
    state: &AppState<S, M>,
    fields: &RequestFields,
) -> Result<SaveResponse, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let name = fields.string(&["name", "storyName"]);
    let content = fields.string(&["content", "story", "storyContent"]);
    let (Some(name), Some(content)) = (name, content) else {
        return Err(ServiceError::Validation(
            "Story name and content are required".to_string(),
        ));
    };

    let kind = resolve_content_type(name, fields.flag("isCanvas"));
    let key = derive_key(name, kind.extension());

    let body = if kind.is_binary() {
        BASE64
            .decode(content)
            .map_err(|e| ServiceError::Decode(format!("Invalid base64 data: {}", e)))?
    } else {
        content.as_bytes().to_vec()
    };

    let size = body.len();
    state
        .store
        .put(&key, Bytes::from(body), kind.content_type())
        .await?;

    info!(key = %key, kind = ?kind, size, "saved file");
    Ok(SaveResponse::new(key))
}

/// Load a canvas and return it base64-encoded as `imageData`.
pub async fn load_canvas<S, M>(
    state: &AppState<S, M>,
    fields: &RequestFields,
) -> Result<Value, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let filename = fields
        .string(&["filename"])
        .ok_or_else(|| ServiceError::Validation("filename required".to_string()))?;

    let data = state
        .store
        .get(filename)
        .await
        .map_err(missing_as("Canvas not found"))?;

    Ok(json!({ "imageData": BASE64.encode(&data) }))
}

/// Load a story or character sheet as text.
pub async fn load_story<S, M>(
    state: &AppState<S, M>,
    fields: &RequestFields,
) -> Result<Value, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let filename = fields
        .string(&["filename"])
        .ok_or_else(|| ServiceError::Validation("filename required".to_string()))?;

    let data = state
        .store
        .get(filename)
        .await
        .map_err(missing_as("Story not found"))?;

    Ok(json!({
        "filename": filename,
        "content": String::from_utf8_lossy(&data),
    }))
}

/// List stored text files.
///
/// Only keys ending in `.txt` are returned; canvases and generated images
/// share the bucket but are skipped.
pub async fn list_stories<S, M>(state: &AppState<S, M>) -> Result<StoriesResponse, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let stories = state
        .store
        .list(None)
        .await?
        .into_iter()
        .filter(|obj| obj.key.ends_with(".txt"))
        .map(|obj| StorySummary {
            filename: obj.key,
            last_modified: obj.last_modified,
            size: obj.size,
        })
        .collect();

    Ok(StoriesResponse { stories })
}

/// Delete a stored file.
///
/// Existence is checked with HEAD first; an absent key answers 404 without
/// issuing the delete.
pub async fn delete_story<S, M>(
    state: &AppState<S, M>,
    fields: &RequestFields,
) -> Result<Value, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let filename = fields
        .string(&["filename"])
        .ok_or_else(|| ServiceError::Validation("filename required".to_string()))?;

    state
        .store
        .head(filename)
        .await
        .map_err(missing_as("File not found"))?;

    state.store.delete(filename).await?;

    info!(key = %filename, "deleted file");
    Ok(json!({
        "message": "Story deleted successfully",
        "filename": filename,
    }))
}

/// Generate an illustration and return its signed URL as `imageUrl`.
pub async fn generate_image<S, M>(
    state: &AppState<S, M>,
    fields: &RequestFields,
) -> Result<Value, ServiceError>
where
    S: ObjectStore,
    M: ImageModel,
{
    let text = fields
        .string(&["text"])
        .ok_or_else(|| ServiceError::Validation("text required".to_string()))?;

    let result = state.pipeline.generate(text).await?;

    Ok(json!({ "imageUrl": result.image_url }))
}

// =============================================================================
// HTTP Handlers
// =============================================================================

/// `POST /save`
pub async fn save_handler<S, M>(State(state): State<AppState<S, M>>, body: Bytes) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::Save, &body).await
}

/// `POST /canvas`
pub async fn load_canvas_handler<S, M>(
    State(state): State<AppState<S, M>>,
    body: Bytes,
) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::LoadCanvas, &body).await
}

/// `POST /load`
pub async fn load_story_handler<S, M>(
    State(state): State<AppState<S, M>>,
    body: Bytes,
) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::LoadStory, &body).await
}

/// `GET /list` and `POST /list`
pub async fn list_handler<S, M>(State(state): State<AppState<S, M>>, body: Bytes) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::List, &body).await
}

/// `POST /delete`
pub async fn delete_handler<S, M>(State(state): State<AppState<S, M>>, body: Bytes) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::Delete, &body).await
}

/// `POST /imagegenerator`
pub async fn generate_handler<S, M>(State(state): State<AppState<S, M>>, body: Bytes) -> Envelope
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    dispatch_bytes(&state, HandlerKind::Generate, &body).await
}

/// `POST /functions/{name}/invocations`
///
/// The request body is the event and the response body is the envelope
/// itself, serialized as JSON with HTTP 200, the way a function runtime
/// returns it. Unknown function names answer with a 404 envelope.
pub async fn invoke_handler<S, M>(
    State(state): State<AppState<S, M>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    let kind = match name.parse::<HandlerKind>() {
        Ok(kind) => kind,
        Err(err) => return Envelope::from_error(&err).into_response(),
    };

    let envelope = dispatch_bytes(&state, kind, &body).await;
    Json(envelope).into_response()
}

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
