//! Generation pipeline: story text in, stored illustration and signed URL out.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{GenerationError, ModelError};
use crate::naming::PNG_CONTENT_TYPE;
use crate::store::ObjectStore;

use super::model::{ImageModel, TextToImageRequest};

/// Number of characters of story text embedded in the prompt.
pub const MAX_PROMPT_CHARS: usize = 500;

/// Negative prompt sent with every request.
pub const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted";

/// Default validity of the returned image URL (1 hour).
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(3600);

// =============================================================================
// Prompt and Key
// =============================================================================

/// Build the prompt from the first [`MAX_PROMPT_CHARS`] characters of `text`.
pub fn build_prompt(text: &str) -> String {
    let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    format!(
        "Create a beautiful, artistic illustration for this story: {}...",
        excerpt
    )
}

/// Storage key for the illustration of `text`.
///
/// The key is a SHA-256 digest of the full text, so the same story always
/// maps to the same object and regenerating it overwrites the previous
/// image. Two texts with equal digests would overwrite each other as well.
pub fn generated_key(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("generated-{}.png", hex::encode(digest))
}

// =============================================================================
// Generation Result
// =============================================================================

/// Outcome of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Time-limited URL for the stored image
    pub image_url: String,

    /// Key under which the image was stored
    pub key: String,

    /// Validity window of `image_url`
    pub expires_in: Duration,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Turns story text into a stored illustration.
///
/// Stages run strictly in order and the first failure is returned. Nothing
/// is cleaned up on failure: a model call whose output could not be stored
/// simply leaves nothing behind.
pub struct GenerationPipeline<S: ObjectStore, M: ImageModel> {
    store: Arc<S>,
    model: Arc<M>,
    url_ttl: Duration,
}

impl<S: ObjectStore, M: ImageModel> GenerationPipeline<S, M> {
    /// Create a pipeline with the default one-hour URL validity.
    pub fn new(store: Arc<S>, model: Arc<M>) -> Self {
        Self {
            store,
            model,
            url_ttl: DEFAULT_URL_TTL,
        }
    }

    /// Set the validity window of issued URLs.
    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    /// Validity window of issued URLs.
    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }

    /// Generate, store and sign an illustration for `text`.
    pub async fn generate(&self, text: &str) -> Result<GenerationResult, GenerationError> {
        if text.is_empty() {
            return Err(GenerationError::EmptyText);
        }

        let request = TextToImageRequest::new(build_prompt(text), NEGATIVE_PROMPT);
        let response = self.model.invoke(&request).await?;

        let encoded = response.images.first().ok_or(ModelError::NoImages)?;
        let image = BASE64
            .decode(encoded)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        debug!(bytes = image.len(), "decoded generated image");

        let key = generated_key(text);
        self.store
            .put(&key, Bytes::from(image), PNG_CONTENT_TYPE)
            .await?;

        let image_url = self.store.signed_url(&key, self.url_ttl).await?;
        info!(key = %key, ttl_secs = self.url_ttl.as_secs(), "stored generated illustration");

        Ok(GenerationResult {
            image_url,
            key,
            expires_in: self.url_ttl,
        })
    }
}
