//! Illustration generation.
//!
//! ```text
//! text ──► prompt ──► ImageModel ──► base64 decode ──► ObjectStore::put
//!                                                           │
//!                                    imageUrl ◄── signed_url ◄┘
//! ```
//!
//! - [`GenerationPipeline`]: runs the stages above and reports the first failure
//! - [`ImageModel`]: model invocation seam, with [`BedrockImageModel`] for Titan
//! - [`TextToImageRequest`] / [`TextToImageResponse`]: the model's JSON schema

mod model;
mod pipeline;

pub use model::{
    BedrockImageModel, ImageGenerationConfig, ImageModel, TextToImageParams, TextToImageRequest,
    TextToImageResponse, DEFAULT_MODEL_ID,
};
pub use pipeline::{
    build_prompt, generated_key, GenerationPipeline, GenerationResult, DEFAULT_URL_TTL,
    MAX_PROMPT_CHARS, NEGATIVE_PROMPT,
};
