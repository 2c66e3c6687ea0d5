//! Logo asset storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{EtiketError, Result};
use crate::layout::OwnerScope;

/// Upload sink for logo images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` as a logo for `scope` and return its public URL.
    ///
    /// Uploading to an existing key overwrites it.
    async fn upload_logo(&self, scope: &OwnerScope, bytes: &[u8], file_name: &str)
    -> Result<String>;
}

/// Detect the image format of an upload, rejecting anything that is not an image.
fn sniff(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(EtiketError::validation("logo", "empty upload"));
    }
    image::guess_format(bytes)
        .map_err(|_| EtiketError::validation("logo", "not a recognised image format"))
}

/// Storage key for a logo: `logos/<scope>/<millis>-<file name>`.
///
/// The file name is reduced to `[A-Za-z0-9._-]` and gets an extension
/// matching `format` when it has none.
pub fn logo_key(scope: &OwnerScope, file_name: &str, format: ImageFormat, now: DateTime<Utc>) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let mut safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe = safe.trim_matches('.').to_string();
    if safe.is_empty() {
        safe = "logo".to_string();
    }
    if Path::new(&safe).extension().is_none() {
        if let Some(ext) = format.extensions_str().first() {
            safe = format!("{}.{}", safe, ext);
        }
    }
    format!("logos/{}/{}-{}", scope.key(), now.timestamp_millis(), safe)
}

/// Writes logos under a directory served at `public_base_url`.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn upload_logo(
        &self,
        scope: &OwnerScope,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<String> {
        let format = sniff(bytes)?;
        let key = logo_key(scope, file_name, format, Utc::now());
        let path = self.root.join(&key);

        let write = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, bytes).await
        };
        write.await.map_err(|e| {
            EtiketError::StorageFailure(format!("failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(scope = %scope, key = %key, size = bytes.len(), "logo uploaded");
        Ok(self.public_url(&key))
    }
}

/// An asset held by [`MemoryAssetStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory asset store, for tests and the preview CLI.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, StoredAsset>>,
}

impl MemoryAssetStore {
    /// URL prefix of returned logo URLs.
    pub const URL_PREFIX: &'static str = "memory://";

    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an asset by the URL `upload_logo` returned.
    pub async fn get(&self, url: &str) -> Option<StoredAsset> {
        let key = url.strip_prefix(Self::URL_PREFIX)?;
        self.assets.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload_logo(
        &self,
        scope: &OwnerScope,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<String> {
        let format = sniff(bytes)?;
        let key = logo_key(scope, file_name, format, Utc::now());
        let content_type = mime_guess::from_path(&key)
            .first_or_octet_stream()
            .to_string();
        self.assets.write().await.insert(
            key.clone(),
            StoredAsset {
                bytes: bytes.to_vec(),
                content_type,
            },
        );
        Ok(format!("{}{}", Self::URL_PREFIX, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 11, 30, 0).unwrap()
    }

    #[test]
    fn test_logo_key_sanitizes() {
        let key = logo_key(&OwnerScope::user("m 1"), "../Şirket Logo.png", ImageFormat::Png, at());
        assert_eq!(key, "logos/user-m_1/1715686200000-_irket_Logo.png");
    }

    #[test]
    fn test_logo_key_adds_extension() {
        let key = logo_key(&OwnerScope::Tenant, "brand", ImageFormat::Jpeg, at());
        assert!(key.starts_with("logos/tenant/1715686200000-brand."));
        assert!(key.ends_with(".jpg") || key.ends_with(".jpeg"));
        let key = logo_key(&OwnerScope::Tenant, "", ImageFormat::Png, at());
        assert!(key.ends_with("-logo.png"));
    }

    #[tokio::test]
    async fn test_memory_upload_roundtrip() {
        let store = MemoryAssetStore::new();
        let url = store
            .upload_logo(&OwnerScope::Tenant, PNG_MAGIC, "logo.png")
            .await
            .unwrap();
        assert!(url.starts_with("memory://logos/tenant/"));
        let asset = store.get(&url).await.unwrap();
        assert_eq!(asset.content_type, "image/png");
        assert_eq!(asset.bytes, PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let store = MemoryAssetStore::new();
        let err = store
            .upload_logo(&OwnerScope::Tenant, b"hello world", "logo.png")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("logo"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_fs_store_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), "http://localhost:8080/assets/");
        let url = store
            .upload_logo(&OwnerScope::user("m-7"), PNG_MAGIC, "brand.png")
            .await
            .unwrap();

        let key = url
            .strip_prefix("http://localhost:8080/assets/")
            .unwrap();
        assert!(key.starts_with("logos/user-m-7/"));
        let written = std::fs::read(store.root().join(key)).unwrap();
        assert_eq!(written, PNG_MAGIC);
    }
}
