//! Configuration management for the story store.
//!
//! Options come from command-line arguments or `STORY_`-prefixed
//! environment variables:
//!
//! - `STORY_HOST` - Server bind address (default: 0.0.0.0)
//! - `STORY_PORT` - Server port (default: 3000)
//! - `STORY_S3_BUCKET` - Bucket holding all assets (default: capstone-story-project)
//! - `STORY_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `STORY_S3_REGION` - S3 region (default: us-east-1)
//! - `STORY_MODEL_ID` - Image model id (default: amazon.titan-image-generator-v1)
//! - `STORY_MODEL_REGION` - Bedrock region (default: us-east-1)
//! - `STORY_URL_TTL` - Signed URL validity in seconds (default: 3600)
//!
//! The parsed CLI is turned once into an immutable [`ServiceConfig`] that is
//! handed to each component constructor.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::generate::{DEFAULT_MODEL_ID, DEFAULT_URL_TTL};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bucket.
pub const DEFAULT_BUCKET: &str = "capstone-story-project";

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// CLI
// =============================================================================

/// Story Store - content storage for story drafts, characters and canvases.
#[derive(Parser, Debug, Clone)]
#[command(name = "story-store")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Check bucket connectivity and optionally list stories
    Check(CheckConfig),
}

/// Object store connection settings shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Bucket holding stories, canvases and generated images.
    #[arg(long, default_value = DEFAULT_BUCKET, env = "STORY_S3_BUCKET")]
    pub s3_bucket: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "STORY_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "STORY_S3_REGION")]
    pub s3_region: String,
}

/// Options for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "STORY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "STORY_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Image generation model id.
    #[arg(long, default_value = DEFAULT_MODEL_ID, env = "STORY_MODEL_ID")]
    pub model_id: String,

    /// Region of the image generation model.
    #[arg(long, default_value = DEFAULT_REGION, env = "STORY_MODEL_REGION")]
    pub model_region: String,

    /// Validity of generated image URLs in seconds.
    #[arg(long, default_value_t = DEFAULT_URL_TTL.as_secs(), env = "STORY_URL_TTL")]
    pub url_ttl: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

/// Options for `check`.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// List stored stories after the connectivity check.
    #[arg(long, default_value_t = false)]
    pub list_stories: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Immutable process-wide settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bucket: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub model_id: String,
    pub model_region: String,
    pub url_ttl: Duration,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.s3_bucket.is_empty() {
            return Err(
                "S3 bucket name is required. Set --s3-bucket or STORY_S3_BUCKET".to_string(),
            );
        }
        if self.model_id.is_empty() {
            return Err("model id is required. Set --model-id or STORY_MODEL_ID".to_string());
        }
        if self.url_ttl == 0 {
            return Err("url_ttl must be greater than 0".to_string());
        }
        // Presigned URLs cannot outlive seven days
        if self.url_ttl > 7 * 24 * 3600 {
            return Err("url_ttl must be at most 604800 seconds (7 days)".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Freeze the parsed options into a [`ServiceConfig`].
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            bucket: self.storage.s3_bucket.clone(),
            s3_endpoint: self.storage.s3_endpoint.clone(),
            s3_region: self.storage.s3_region.clone(),
            model_id: self.model_id.clone(),
            model_region: self.model_region.clone(),
            url_ttl: Duration::from_secs(self.url_ttl),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
