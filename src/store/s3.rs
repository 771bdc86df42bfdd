use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ObjectHead, ObjectStore, ObjectSummary};
use crate::error::StoreError;

/// S3-backed implementation of [`ObjectStore`].
///
/// All operations target a single bucket fixed at construction.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store for the given bucket.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    /// Map an SDK error to a store error.
    ///
    /// `service_not_found` is the operation-specific answer from the modeled
    /// service error. A raw 404 status or a not-found error code in the
    /// message also count, since S3-compatible services are not consistent
    /// about which one they send.
    fn classify<E, R>(&self, key: &str, err: SdkError<E, R>, service_not_found: bool) -> StoreError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        if service_not_found {
            return StoreError::NotFound(self.location(key));
        }

        if let SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) = &err {
            return StoreError::Connection(err.to_string());
        }

        let err_str = match &err {
            SdkError::ServiceError(service) => format!("{}", service.err()),
            other => other.to_string(),
        };
        if err_str.contains("NotFound") || err_str.contains("NoSuchKey") {
            return StoreError::NotFound(self.location(key));
        }

        StoreError::Backend(err_str)
    }
}

fn is_404<E>(err: &SdkError<E>) -> bool {
    err.raw_response()
        .map(|r| r.status().as_u16() == 404)
        .unwrap_or(false)
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        debug!(bucket = %self.bucket, key, "get_object");

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                    || is_404(&e);
                self.classify(key, e, not_found)
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();

        Ok(data)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key, content_type, size = body.len(), "put_object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| self.classify(key, e, false))?;

        Ok(())
    }

    async fn head(&self, key: &str) -> Result<ObjectHead, StoreError> {
        debug!(bucket = %self.bucket, key, "head_object");

        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false)
                    || is_404(&e);
                self.classify(key, e, not_found)
            })?;

        Ok(ObjectHead {
            size: head.content_length().unwrap_or(0).max(0) as u64,
            content_type: head.content_type().map(str::to_string),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        debug!(bucket = %self.bucket, key, "delete_object");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let not_found = is_404(&e);
                self.classify(key, e, not_found)
            })?;

        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .max_keys(1000);

            if let Some(prefix) = prefix {
                request = request.prefix(prefix);
            }
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let result = request
                .send()
                .await
                .map_err(|e| self.classify(prefix.unwrap_or(""), e, false))?;

            for obj in result.contents() {
                if let Some(key) = obj.key() {
                    objects.push(ObjectSummary {
                        key: key.to_string(),
                        last_modified: obj.last_modified().and_then(to_chrono),
                        size: obj.size().unwrap_or(0).max(0) as u64,
                    });
                }
            }

            if result.is_truncated() == Some(true) {
                continuation_token = result.next_continuation_token().map(|s| s.to_string());
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(bucket = %self.bucket, count = objects.len(), "list_objects_v2");
        Ok(objects)
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let presign_config =
            PresigningConfig::expires_in(ttl).map_err(|e| StoreError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StoreError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
