//! Image model request/response schema and the Bedrock client.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

/// Default Bedrock model used for illustrations.
pub const DEFAULT_MODEL_ID: &str = "amazon.titan-image-generator-v1";

// =============================================================================
// Request / Response Schema
// =============================================================================

/// Text-to-image request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageRequest {
    /// Always `"TEXT_IMAGE"`
    pub task_type: String,

    pub text_to_image_params: TextToImageParams,

    pub image_generation_config: ImageGenerationConfig,
}

/// Prompt and negative prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageParams {
    pub text: String,
    pub negative_text: String,
}

/// Fixed generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationConfig {
    pub number_of_images: u32,
    pub height: u32,
    pub width: u32,
    pub cfg_scale: f32,
    pub seed: u32,
}

impl Default for ImageGenerationConfig {
    /// One 512x512 image with a fixed seed, so identical prompts give
    /// identical requests.
    fn default() -> Self {
        Self {
            number_of_images: 1,
            height: 512,
            width: 512,
            cfg_scale: 8.0,
            seed: 0,
        }
    }
}

impl TextToImageRequest {
    /// Build a request with the default generation settings.
    pub fn new(text: impl Into<String>, negative_text: impl Into<String>) -> Self {
        Self {
            task_type: "TEXT_IMAGE".to_string(),
            text_to_image_params: TextToImageParams {
                text: text.into(),
                negative_text: negative_text.into(),
            },
            image_generation_config: ImageGenerationConfig::default(),
        }
    }
}

/// Text-to-image response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToImageResponse {
    /// Base64-encoded images
    #[serde(default)]
    pub images: Vec<String>,
}

// =============================================================================
// ImageModel Trait
// =============================================================================

/// A generative image model.
///
/// The call is synchronous from the caller's point of view: it returns once
/// the model has produced its images or failed.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Invoke the model with a text-to-image request.
    async fn invoke(&self, request: &TextToImageRequest)
        -> Result<TextToImageResponse, ModelError>;
}

// =============================================================================
// Bedrock
// =============================================================================

/// [`ImageModel`] backed by Bedrock Runtime `InvokeModel`.
#[derive(Clone)]
pub struct BedrockImageModel {
    client: Client,
    model_id: String,
}

impl BedrockImageModel {
    /// Wrap an existing Bedrock Runtime client.
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// Build a client for the given region from the default credential chain.
    pub async fn connect(region: &str, model_id: impl Into<String>) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        Self::new(Client::new(&sdk_config), model_id)
    }

    /// Get the model identifier.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ImageModel for BedrockImageModel {
    async fn invoke(
        &self,
        request: &TextToImageRequest,
    ) -> Result<TextToImageResponse, ModelError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| ModelError::Invocation(format!("failed to encode request: {}", e)))?;

        debug!(model_id = %self.model_id, bytes = body.len(), "invoke_model");

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| ModelError::Invocation(e.to_string()))?;

        serde_json::from_slice(output.body().as_ref())
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}
