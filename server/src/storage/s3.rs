//! S3 Image Store
//!
//! Stores uploads in any S3-compatible backend: AWS S3, `MinIO`, Backblaze B2,
//! Cloudflare R2.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    config::{Credentials, IdentityCache, SharedCredentialsProvider, StalledStreamProtectionConfig},
    primitives::ByteStream,
    Client,
};
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ImageStore, UploadError};
use crate::config::Config;
use crate::db::StoredImage;

/// S3 client wrapper with the bucket and URL settings it publishes under.
#[derive(Clone)]
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    public_url: Option<String>,
}

impl S3ImageStore {
    /// Create a new store from configuration.
    ///
    /// Uses path-style addressing when a custom endpoint is configured.
    pub fn new(config: &Config) -> Self {
        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.s3_region.clone()))
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
            .identity_cache(IdentityCache::no_cache());

        if let (Ok(access_key), Ok(secret_key)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let credentials = Credentials::new(access_key, secret_key, None, None, "environment");
            s3_config_builder =
                s3_config_builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!(
            bucket = %config.s3_bucket,
            endpoint = ?config.s3_endpoint,
            "S3 image store initialized"
        );

        Self {
            client,
            bucket: config.s3_bucket.clone(),
            region: config.s3_region.clone(),
            endpoint: config.s3_endpoint.clone(),
            public_url: config.s3_public_url.clone(),
        }
    }

    /// Check if the bucket is accessible.
    pub async fn health_check(&self) -> Result<(), UploadError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| UploadError::Storage(format!("Bucket not accessible: {e}")))?;

        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        public_url(
            self.public_url.as_deref(),
            self.endpoint.as_deref(),
            &self.bucket,
            &self.region,
            key,
        )
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, data: Bytes, folder: &str) -> Result<StoredImage, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }

        let (extension, content_type) = sniff(&data);
        let key = object_key(folder, extension);

        debug!(key = %key, size = data.len(), content_type, "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;

        Ok(StoredImage {
            url: self.object_url(&key),
            public_id: key,
        })
    }
}

/// File extension and MIME type detected from magic bytes.
fn sniff(data: &[u8]) -> (&'static str, &'static str) {
    infer::get(data).map_or(("bin", "application/octet-stream"), |kind| {
        (kind.extension(), kind.mime_type())
    })
}

fn object_key(folder: &str, extension: &str) -> String {
    let folder = folder.trim_matches('/');
    format!("{folder}/{}.{extension}", Uuid::now_v7())
}

/// Public URL for `key`: the configured public base wins, then the custom
/// endpoint in path style, then AWS virtual-host style.
fn public_url(
    public_base: Option<&str>,
    endpoint: Option<&str>,
    bucket: &str,
    region: &str,
    key: &str,
) -> String {
    if let Some(base) = public_base {
        return format!("{}/{key}", base.trim_end_matches('/'));
    }
    if let Some(endpoint) = endpoint {
        return format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/'));
    }
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}
