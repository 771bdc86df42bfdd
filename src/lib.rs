//! # Story Store
//!
//! A stateless content-storage service for a story authoring application.
//! Clients save text stories, character sheets and hand-drawn canvases; the
//! service can also illustrate a story with a generative image model and hand
//! back a time-limited URL to the stored image. All durable state lives in a
//! single S3 bucket.
//!
//! ## Architecture
//!
//! - [`naming`] - Content classification and key derivation (pure)
//! - [`store`] - Object store trait and the S3 implementation
//! - [`generate`] - Image model client and the generation pipeline
//! - [`server`] - Request normalization, handlers and the Axum router
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use story_store::{
//!     create_router, create_s3_client, AppState, BedrockImageModel, GenerationPipeline,
//!     RouterConfig, S3ObjectStore,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_s3_client(None, "us-east-1").await;
//!     let store = Arc::new(S3ObjectStore::new(client, "my-stories"));
//!     let model = Arc::new(
//!         BedrockImageModel::connect("us-east-1", "amazon.titan-image-generator-v1").await,
//!     );
//!
//!     let pipeline = GenerationPipeline::new(Arc::clone(&store), model);
//!     let router = create_router(AppState::new(store, pipeline), RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod naming;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, ServiceConfig, StorageArgs};
pub use error::{GenerationError, ModelError, ServiceError, StoreError};
pub use generate::{
    build_prompt, generated_key, BedrockImageModel, GenerationPipeline, GenerationResult,
    ImageModel, TextToImageRequest, TextToImageResponse,
};
pub use naming::{derive_key, resolve_content_type, sanitize_name, ContentKind};
pub use server::{create_router, dispatch, AppState, Envelope, HandlerKind, RequestFields, RouterConfig};
pub use store::{create_s3_client, ObjectHead, ObjectStore, ObjectSummary, S3ObjectStore};
