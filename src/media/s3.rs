use std::time::Duration;

use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::{MediaObject, MediaStore};
use crate::config::MediaConfig;

/// S3-compatible bucket (MinIO in development); reads are presigned redirects.
#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    presign_ttl: Duration,
}

impl S3MediaStore {
    pub async fn new(cfg: &MediaConfig, presign_seconds: u64) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            presign_ttl: Duration::from_secs(presign_seconds),
        })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        debug!(%key, "media stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {key}"))?;
        Ok(())
    }

    async fn open(&self, key: &str) -> anyhow::Result<Option<MediaObject>> {
        // The bucket answers 404 itself when the key is gone.
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(self.presign_ttl)?)
            .await
            .with_context(|| format!("s3 presign {key}"))?;
        Ok(Some(MediaObject::Presigned(presigned.uri().to_string())))
    }
}
