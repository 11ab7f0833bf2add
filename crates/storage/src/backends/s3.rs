//! S3-compatible object store (AWS S3, Cloudflare R2, MinIO).

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectStore;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use bytes::Bytes;
use std::time::Duration;
use tracing::instrument;

const DEFAULT_REGION: &str = "us-east-1";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`S3Backend`].
#[derive(Clone, Debug, Default)]
pub struct S3BackendOptions {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub prefix: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Path-style addressing (`endpoint/bucket/key`). MinIO needs it.
    pub force_path_style: bool,
    /// Upload objects with the `public-read` canned ACL.
    pub public_read: bool,
}

/// Icon store backed by an S3-compatible bucket.
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    endpoint: String,
    region: String,
    public_read: bool,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("public_read", &self.public_read)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    pub async fn new(options: S3BackendOptions) -> StorageResult<Self> {
        let S3BackendOptions {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
            public_read,
        } = options;

        let region = region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = endpoint.as_deref().map(normalize_endpoint);

        let mut builder = match (access_key_id, secret_access_key) {
            (Some(key_id), Some(secret)) => aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .credentials_provider(Credentials::new(key_id, secret, None, None, "presence")),
            (None, None) => {
                // Ambient credentials: environment, profile, or instance role.
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(region.clone()))
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::Config(
                    "s3 storage needs both access_key_id and secret_access_key, or neither"
                        .to_string(),
                ));
            }
        };

        if let Some(url) = &endpoint {
            builder = builder.endpoint_url(url);
            // Plain-HTTP endpoints (local MinIO) need no TLS roots.
            if url.to_ascii_lowercase().starts_with("http://") {
                builder = builder.http_client(SmithyHttpClientBuilder::new().build_http());
            }
        }
        if force_path_style {
            builder = builder.force_path_style(true);
        }

        let endpoint = endpoint.unwrap_or_else(|| format!("s3.{region}.amazonaws.com"));
        let prefix = prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket,
            prefix,
            endpoint,
            region,
            public_read,
        })
    }

    /// Endpoint this backend talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Region used for request signing.
    pub fn region(&self) -> &str {
        &self.region
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }
}

/// HTTP status of a service error response, if the request got that far.
fn response_status<E>(err: &SdkError<E>) -> Option<u16> {
    match err {
        SdkError::ServiceError(service_err) => Some(service_err.raw().status().as_u16()),
        _ => None,
    }
}

fn s3_error<E>(err: SdkError<E>, key: &str) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if response_status(&err) == Some(404) {
        return StorageError::NotFound(key.to_string());
    }
    StorageError::S3(Box::new(err))
}

/// Bare `host:port` endpoints (e.g. `minio:9000`) get an `http://` scheme.
fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    #[instrument(skip(self), fields(backend = "s3"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if response_status(&err) == Some(404) => Ok(false),
            Err(err) => Err(StorageError::S3(Box::new(err))),
        }
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| s3_error(e, key))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(Box::new(e)))?;
        Ok(body.into_bytes())
    }

    #[instrument(skip(self, data), fields(backend = "s3", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .content_type(content_type)
            .body(data.into());

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        // Non-2xx responses surface as errors from `send`.
        request.send().await.map_err(|e| s3_error(e, key))?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        // DeleteObject succeeds on missing keys; report NotFound like the
        // filesystem backend does.
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| s3_error(e, key))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn health_check(&self) -> StorageResult<()> {
        let head = self.client.head_bucket().bucket(&self.bucket).send();

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, head).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(StorageError::S3(Box::new(err))),
            Err(_) => Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("S3 health check timed out after {HEALTH_CHECK_TIMEOUT:?}"),
            ))),
        }
    }
}
