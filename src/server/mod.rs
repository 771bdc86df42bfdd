//! HTTP server layer for the story store.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          HTTP Layer                          │
//! │                                                              │
//! │  ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐   │
//! │  │   routes    │──►│     handlers     │──►│   envelope   │   │
//! │  │  (router)   │   │ (save/load/...)  │   │ (in & out)   │   │
//! │  └─────────────┘   └──────────────────┘   └──────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod envelope;
pub mod handlers;
pub mod routes;

pub use envelope::{Envelope, RequestFields, ALLOW_ORIGIN_HEADER};
pub use handlers::{
    delete_story, dispatch, generate_image, handle, health_handler, list_stories, load_canvas,
    load_story, save_story, AppState, HandlerKind, HealthResponse, SaveResponse, StoriesResponse,
    StorySummary,
};
pub use routes::{create_router, RouterConfig};
