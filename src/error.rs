use http::StatusCode;
use thiserror::Error;

/// Errors returned by object store operations.
///
/// `NotFound` is a distinct variant so callers can tell a missing key apart
/// from a failed round trip without inspecting backend error types.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The referenced key does not exist in the bucket
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Error reported by S3 or the S3-compatible service
    #[error("S3 error: {0}")]
    Backend(String),

    /// Network or connection error while talking to the store
    #[error("Connection error: {0}")]
    Connection(String),

    /// A signed URL could not be produced
    #[error("Presign error: {0}")]
    Presign(String),
}

/// Errors from the image generation model.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The model invocation itself failed
    #[error("Model invocation failed: {0}")]
    Invocation(String),

    /// The model answered with a body we could not interpret
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// The model answered without any image
    #[error("Model returned no images")]
    NoImages,
}

/// Errors raised by the generation pipeline.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// No text was supplied to illustrate
    #[error("text required")]
    EmptyText,

    /// Model invocation or response parsing failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The returned image was not valid base64
    #[error("Invalid image data from model: {0}")]
    Decode(String),

    /// Persisting the image or signing its URL failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by request handlers.
///
/// Every handler converts its failures into this type and then into a
/// response envelope; the status code is fixed per variant.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Missing or malformed required field
    #[error("{0}")]
    Validation(String),

    /// Referenced key is absent
    #[error("{0}")]
    NotFound(String),

    /// Malformed base64 payload
    #[error("{0}")]
    Decode(String),

    /// Object store call failed
    #[error(transparent)]
    Store(StoreError),

    /// Image model call failed
    #[error(transparent)]
    Model(ModelError),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

impl ServiceError {
    /// HTTP status code used for this error in the response envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) | ServiceError::Model(_) | ServiceError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short identifier used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Decode(_) => "decode_error",
            ServiceError::Store(_) => "store_error",
            ServiceError::Model(_) => "model_error",
            ServiceError::Unknown(_) => "unknown_error",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Store(err)
    }
}

impl From<GenerationError> for ServiceError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::EmptyText => ServiceError::Validation(err.to_string()),
            GenerationError::Model(e) => ServiceError::Model(e),
            // The model produced it, so the client is not at fault
            GenerationError::Decode(msg) => {
                ServiceError::Model(ModelError::InvalidResponse(msg))
            }
            GenerationError::Store(e) => ServiceError::Store(e),
        }
    }
}
