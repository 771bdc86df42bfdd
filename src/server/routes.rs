//! Router configuration for the story store.
//!
//! # Route Structure
//!
//! ```text
//! /health                          - Health check
//! /save                            - Save story / character / canvas
//! /canvas                          - Load canvas
//! /load                            - Load story text
//! /list                            - List stories
//! /delete                          - Delete file (POST or DELETE)
//! /imagegenerator                  - Generate illustration
//! /functions/{name}/invocations    - Raw event invocation
//! ```

use std::any::Any;
use std::time::Duration;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use super::envelope::Envelope;
use super::handlers::{
    delete_handler, generate_handler, health_handler, invoke_handler, list_handler,
    load_canvas_handler, load_story_handler, save_handler, AppState,
};
use crate::error::ServiceError;
use crate::generate::ImageModel;
use crate::store::ObjectStore;

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

/// Create the application router.
///
/// Every route answers with the handler's envelope translated to HTTP, except
/// the invocation route which returns the envelope itself as JSON.
pub fn create_router<S, M>(state: AppState<S, M>, config: RouterConfig) -> Router
where
    S: ObjectStore + 'static,
    M: ImageModel + 'static,
{
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/save", post(save_handler::<S, M>))
        .route("/canvas", post(load_canvas_handler::<S, M>))
        .route("/load", post(load_story_handler::<S, M>))
        .route(
            "/list",
            get(list_handler::<S, M>).post(list_handler::<S, M>),
        )
        .route(
            "/delete",
            post(delete_handler::<S, M>).delete(delete_handler::<S, M>),
        )
        .route("/imagegenerator", post(generate_handler::<S, M>))
        .route(
            "/functions/{name}/invocations",
            post(invoke_handler::<S, M>),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(build_cors_layer());

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Turn a panicked handler into a 500 envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    Envelope::from_error(&ServiceError::Unknown(message)).into_response()
}

/// Preflight handling for browser clients on any origin.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
}
