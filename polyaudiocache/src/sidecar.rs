//! Metadata sidecars.
//!
//! Each cached content file is paired with a small JSON sidecar recording the
//! response headers needed to serve it again without re-deriving them. The
//! sidecar is written only *after* the content file's atomic rename, so its
//! presence marks the entry as fully committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidecar {
    pub content_type: String,
    pub content_length: u64,
    pub cached_at: DateTime<Utc>,
}

impl Sidecar {
    pub fn new(content_type: impl Into<String>, content_length: u64) -> Self {
        Self {
            content_type: content_type.into(),
            content_length,
            cached_at: Utc::now(),
        }
    }

    pub async fn read(path: &Path) -> std::io::Result<Sidecar> {
        let data = tokio::fs::read(path).await?;
        serde_json::from_slice(&data).map_err(std::io::Error::other)
    }

    pub async fn write(&self, path: &Path) -> std::io::Result<()> {
        let data = serde_json::to_vec(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.webm.meta");

        let sidecar = Sidecar::new("audio/webm", 12345);
        sidecar.write(&path).await.unwrap();

        let loaded = Sidecar::read(&path).await.unwrap();
        assert_eq!(loaded, sidecar);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let sidecar = Sidecar::new("audio/mpeg", 7);
        let json = serde_json::to_value(&sidecar).unwrap();
        assert_eq!(json["contentType"], "audio/mpeg");
        assert_eq!(json["contentLength"], 7);
        // ISO-8601 timestamp
        assert!(json["cachedAt"].as_str().unwrap().contains('T'));
    }
}
