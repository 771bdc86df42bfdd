//! Object store access.
//!
//! Every read, write and listing is a direct round trip to the backing
//! bucket; nothing is cached in process. The [`ObjectStore`] trait is the
//! seam between request handling and storage, so handlers and the generation
//! pipeline can run against S3 in production and an in-memory fake in tests.

mod s3;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

pub use s3::{create_s3_client, S3ObjectStore};

/// Metadata returned by a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// Object size in bytes
    pub size: u64,

    /// Stored MIME type, if the backend reports one
    pub content_type: Option<String>,
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,

    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,

    /// Object size in bytes
    pub size: u64,
}

/// Operations the service needs from the object store.
///
/// Implementations must not retry; transient failures surface as
/// [`StoreError`] and the caller decides what the client sees.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read a whole object.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Write a whole object, replacing any existing one.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Check that an object exists.
    async fn head(&self, key: &str) -> Result<ObjectHead, StoreError>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List every object, optionally restricted to a key prefix.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectSummary>, StoreError>;

    /// Issue a time-limited, unauthenticated read URL.
    ///
    /// The key is not checked for existence.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;
}
