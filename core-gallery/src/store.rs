//! Binary Store: raw photo bytes keyed by filename.

use crate::error::{GalleryError, Result};
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Filename-keyed blob storage scoped to one namespace.
///
/// Keys are flat names; anything that looks like a path is rejected with
/// [`GalleryError::InvalidKey`].
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait BinaryStore: PlatformSendSync {
    /// Persist `bytes` under `key` and return the backend location.
    ///
    /// The data is durable once this returns.
    async fn write(&self, key: &str, bytes: Bytes) -> Result<String>;

    /// Read the bytes stored under `key`.
    ///
    /// A missing key fails with an error for which
    /// [`GalleryError::is_not_found`] is `true`.
    async fn read(&self, key: &str) -> Result<Bytes>;

    /// Remove `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Every key currently stored, in no particular order.
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Rejects keys that could escape the namespace directory.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") || key.contains('\0') {
        return Err(GalleryError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// [`BinaryStore`] over a host filesystem bridge.
///
/// Blobs live in `<data_dir>/<namespace>/<key>`. On desktop that is a real
/// directory; on the web it is the IndexedDB-backed virtual filesystem.
pub struct FsBinaryStore {
    fs: Arc<dyn FileSystemAccess>,
    root: PathBuf,
}

impl FsBinaryStore {
    /// Resolve the namespace directory and create it if needed.
    pub async fn open(fs: Arc<dyn FileSystemAccess>, namespace: &str) -> Result<Self> {
        validate_key(namespace)?;

        let root = fs.get_data_directory().await?.join(namespace);
        fs.create_dir_all(&root).await?;

        debug!(root = ?root, "Opened binary store");
        Ok(Self { fs, root })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl BinaryStore for FsBinaryStore {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn write(&self, key: &str, bytes: Bytes) -> Result<String> {
        let path = self.path_for(key)?;
        self.fs
            .write_file(&path, bytes)
            .await
            .map_err(|source| GalleryError::StoreWriteFailed {
                key: key.to_string(),
                source,
            })?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        self.fs
            .read_file(&path)
            .await
            .map_err(|source| GalleryError::StoreReadFailed {
                key: key.to_string(),
                source,
            })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match self.fs.delete_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(key, "Blob already absent");
                Ok(())
            }
            Err(source) => Err(GalleryError::StoreDeleteFailed {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let entries = match self.fs.list_directory(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(entries
            .into_iter()
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .filter(|key| validate_key(key).is_ok())
            .collect())
    }
}
