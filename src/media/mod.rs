//! Object storage for uploaded profile media.

use std::collections::HashMap;

use axum::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod handlers;
mod s3;

pub use s3::S3MediaStore;

/// Public path prefix under which stored objects are served.
pub const MEDIA_URL_PREFIX: &str = "/api/media/";

/// How a stored object is handed back to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaObject {
    Presigned(String),
    Inline { body: Bytes, content_type: String },
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// `None` when nothing is stored under `key`.
    async fn open(&self, key: &str) -> anyhow::Result<Option<MediaObject>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Photo,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Photo => "photo",
        }
    }

    /// File extension for an accepted content type of this kind.
    pub fn ext_from_mime(self, content_type: &str) -> Option<&'static str> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match (self, essence.as_str()) {
            (MediaKind::Audio, "audio/webm") => Some("webm"),
            (MediaKind::Audio, "audio/ogg") => Some("ogg"),
            (MediaKind::Audio, "audio/mpeg") => Some("mp3"),
            (MediaKind::Audio, "audio/wav" | "audio/x-wav" | "audio/wave") => Some("wav"),
            (MediaKind::Audio, "audio/mp4") => Some("m4a"),
            (MediaKind::Photo, "image/jpeg" | "image/jpg") => Some("jpg"),
            (MediaKind::Photo, "image/png") => Some("png"),
            (MediaKind::Photo, "image/webp") => Some("webp"),
            _ => None,
        }
    }
}

pub fn object_key(user_id: i32, kind: MediaKind, ext: &str) -> String {
    format!("profiles/{}/{}-{}.{}", user_id, kind.as_str(), Uuid::new_v4(), ext)
}

pub fn media_url(key: &str) -> String {
    format!("{MEDIA_URL_PREFIX}{key}")
}

/// Inverse of [`media_url`]; `None` for URLs this service did not hand out.
pub fn key_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(MEDIA_URL_PREFIX).filter(|k| !k.is_empty())
}

/// Keeps objects in process memory and serves them inline.
#[derive(Default)]
pub struct MemoryMediaStore {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn open(&self, key: &str) -> anyhow::Result<Option<MediaObject>> {
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|(body, content_type)| MediaObject::Inline {
                body: body.clone(),
                content_type: content_type.clone(),
            }))
    }
}
