//! # Platform Encoding Resolver
//!
//! Turns captured assets into storable bytes and stored bytes into URIs the
//! presentation layer can render. The strategy is picked once, at startup,
//! from the host [`Platform`]:
//!
//! | Platform       | Stored payload        | Display URI                          |
//! |----------------|-----------------------|--------------------------------------|
//! | `NativeHybrid` | raw image bytes       | `<origin>/_app_file_<absolute-path>` |
//! | `Web`          | base64 text           | `data:<mime>;base64,<payload>`       |
//!
//! Native display URIs are a pure string transform of the stored path. Web
//! display URIs need the stored payload, so they cost a store read.

use crate::error::{GalleryError, Result};
use crate::models::PhotoRecord;
use crate::store::BinaryStore;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bridge_traits::capture::{AssetSource, BlobResolver, ImageFormat, RawAsset};
use bridge_traits::platform::{Platform, PlatformSendSync};
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const FILE_PATH_PREFIX: &str = "/_app_file_";
const FALLBACK_MIME: &str = "application/octet-stream";

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait EncodingStrategy: PlatformSendSync {
    fn platform(&self) -> Platform;

    /// Bytes to hand to the Binary Store for a freshly captured asset.
    async fn encode_for_store(&self, asset: &RawAsset) -> Result<Bytes>;

    /// Renderable URI for a stored record.
    async fn decode_for_display(
        &self,
        record: &PhotoRecord,
        store: &dyn BinaryStore,
    ) -> Result<String>;

    /// Original captured bytes from a stored payload.
    fn decode_payload(&self, stored: Bytes) -> Result<Bytes>;

    /// The `filepath` recorded for a blob written to `location`.
    fn record_filepath(&self, filename: &str, location: &str) -> String;
}

/// Picks the strategy for `platform`.
///
/// The web strategy needs a [`BlobResolver`] to read transient blob URLs.
pub fn strategy_for(
    platform: Platform,
    file_system: Arc<dyn FileSystemAccess>,
    blob_resolver: Option<Arc<dyn BlobResolver>>,
    webview_origin: &str,
) -> Result<Arc<dyn EncodingStrategy>> {
    match platform {
        Platform::NativeHybrid => Ok(Arc::new(NativeEncoding::new(file_system, webview_origin))),
        Platform::Web => {
            let resolver = blob_resolver.ok_or_else(|| {
                GalleryError::Encoding("Web encoding requires a blob resolver".to_string())
            })?;
            Ok(Arc::new(WebEncoding::new(resolver)))
        }
    }
}

fn platform_mismatch(expected: Platform, asset: &RawAsset) -> GalleryError {
    GalleryError::Encoding(format!(
        "{} encoding cannot store a {} asset",
        expected, asset.platform
    ))
}

// =============================================================================
// Native hybrid
// =============================================================================

/// Stores the captured file's bytes as-is and serves them through the
/// webview's local file route.
pub struct NativeEncoding {
    fs: Arc<dyn FileSystemAccess>,
    origin: String,
}

impl NativeEncoding {
    pub fn new(fs: Arc<dyn FileSystemAccess>, origin: &str) -> Self {
        Self {
            fs,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Webview-loadable URI for an absolute native path. Performs no I/O.
    pub fn display_uri(&self, filepath: &str) -> String {
        let normalized = filepath.replace('\\', "/");
        if normalized.starts_with('/') {
            format!("{}{}{}", self.origin, FILE_PATH_PREFIX, normalized)
        } else {
            format!("{}{}/{}", self.origin, FILE_PATH_PREFIX, normalized)
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl EncodingStrategy for NativeEncoding {
    fn platform(&self) -> Platform {
        Platform::NativeHybrid
    }

    async fn encode_for_store(&self, asset: &RawAsset) -> Result<Bytes> {
        let path = match (&asset.source, asset.platform) {
            (AssetSource::NativePath(path), Platform::NativeHybrid) => path,
            _ => return Err(platform_mismatch(Platform::NativeHybrid, asset)),
        };

        let bytes = self.fs.read_file(path).await.map_err(|e| {
            GalleryError::Encoding(format!("Failed to read captured file: {}", e))
        })?;
        debug!(
            file = %strip_path(&path.to_string_lossy()),
            len = bytes.len(),
            "Read captured file"
        );
        Ok(bytes)
    }

    async fn decode_for_display(
        &self,
        record: &PhotoRecord,
        _store: &dyn BinaryStore,
    ) -> Result<String> {
        Ok(self.display_uri(&record.filepath))
    }

    fn decode_payload(&self, stored: Bytes) -> Result<Bytes> {
        Ok(stored)
    }

    fn record_filepath(&self, _filename: &str, location: &str) -> String {
        location.to_string()
    }
}

// =============================================================================
// Web
// =============================================================================

/// Stores base64 text and rebuilds `data:` URIs on load.
pub struct WebEncoding {
    resolver: Arc<dyn BlobResolver>,
}

impl WebEncoding {
    pub fn new(resolver: Arc<dyn BlobResolver>) -> Self {
        Self { resolver }
    }

    /// MIME type from the filename extension.
    pub fn mime_for(filename: &str) -> &'static str {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .map_or(FALLBACK_MIME, |format| format.mime_type())
    }

    pub fn data_uri(filename: &str, payload: &str) -> String {
        format!("data:{};base64,{}", Self::mime_for(filename), payload)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl EncodingStrategy for WebEncoding {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    async fn encode_for_store(&self, asset: &RawAsset) -> Result<Bytes> {
        let url = match (&asset.source, asset.platform) {
            (AssetSource::WebBlob(url), Platform::Web) => url,
            _ => return Err(platform_mismatch(Platform::Web, asset)),
        };

        let blob = self
            .resolver
            .fetch_blob(url)
            .await
            .map_err(|e| GalleryError::Encoding(format!("Failed to fetch captured blob: {}", e)))?;
        debug!(len = blob.len(), "Fetched captured blob");

        Ok(Bytes::from(BASE64.encode(&blob)))
    }

    async fn decode_for_display(
        &self,
        record: &PhotoRecord,
        store: &dyn BinaryStore,
    ) -> Result<String> {
        let stored = store.read(&record.filename).await?;
        let payload = std::str::from_utf8(&stored).map_err(|_| {
            GalleryError::Encoding(format!("Stored payload for {} is not text", record.filename))
        })?;
        Ok(Self::data_uri(&record.filename, payload.trim()))
    }

    fn decode_payload(&self, stored: Bytes) -> Result<Bytes> {
        BASE64
            .decode(stored.as_ref())
            .map(Bytes::from)
            .map_err(|e| GalleryError::Encoding(format!("Invalid base64 payload: {}", e)))
    }

    fn record_filepath(&self, filename: &str, _location: &str) -> String {
        filename.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use std::path::PathBuf;

    mock! {
        FileSystem {}

        #[async_trait::async_trait]
        impl FileSystemAccess for FileSystem {
            async fn get_data_directory(&self) -> BridgeResult<PathBuf>;
            async fn exists(&self, path: &Path) -> BridgeResult<bool>;
            async fn create_dir_all(&self, path: &Path) -> BridgeResult<()>;
            async fn read_file(&self, path: &Path) -> BridgeResult<Bytes>;
            async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()>;
            async fn delete_file(&self, path: &Path) -> BridgeResult<()>;
            async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>>;
        }
    }

    mock! {
        Resolver {}

        #[async_trait::async_trait]
        impl BlobResolver for Resolver {
            async fn fetch_blob(&self, url: &str) -> BridgeResult<Bytes>;
        }
    }

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl BinaryStore for Store {
            async fn write(&self, key: &str, bytes: Bytes) -> Result<String>;
            async fn read(&self, key: &str) -> Result<Bytes>;
            async fn delete(&self, key: &str) -> Result<()>;
            async fn list_keys(&self) -> Result<Vec<String>>;
        }
    }

    #[test]
    fn test_native_display_uri() {
        let native = NativeEncoding::new(Arc::new(MockFileSystem::new()), "http://localhost/");
        assert_eq!(
            native.display_uri("/data/user/0/app/files/photos/1.jpeg"),
            "http://localhost/_app_file_/data/user/0/app/files/photos/1.jpeg"
        );
        assert_eq!(
            native.display_uri(r"C:\Users\me\photos\1.jpeg"),
            "http://localhost/_app_file_/C:/Users/me/photos/1.jpeg"
        );
    }

    #[tokio::test]
    async fn test_native_display_does_no_io() {
        // No expectations: any store call would panic.
        let store = MockStore::new();
        let native = NativeEncoding::new(Arc::new(MockFileSystem::new()), "http://localhost");
        let record = PhotoRecord::new("1.png", "/photos/1.png");

        let uri = native.decode_for_display(&record, &store).await.unwrap();
        assert_eq!(uri, "http://localhost/_app_file_/photos/1.png");
    }

    #[tokio::test]
    async fn test_native_encode_reads_captured_file() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_file()
            .withf(|path| path == Path::new("/tmp/capture.jpeg"))
            .returning(|_| Ok(Bytes::from_static(b"\xff\xd8jpeg")));
        let native = NativeEncoding::new(Arc::new(fs), "http://localhost");

        let bytes = native
            .encode_for_store(&RawAsset::native("/tmp/capture.jpeg", ImageFormat::Jpeg))
            .await
            .unwrap();
        assert_eq!(bytes, Bytes::from_static(b"\xff\xd8jpeg"));
    }

    #[tokio::test]
    async fn test_strategies_reject_foreign_assets() {
        let native = NativeEncoding::new(Arc::new(MockFileSystem::new()), "http://localhost");
        let web = WebEncoding::new(Arc::new(MockResolver::new()));

        assert!(matches!(
            native
                .encode_for_store(&RawAsset::web("blob:x", ImageFormat::Png))
                .await,
            Err(GalleryError::Encoding(_))
        ));
        assert!(matches!(
            web.encode_for_store(&RawAsset::native("/x.png", ImageFormat::Png))
                .await,
            Err(GalleryError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn test_web_round_trip() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_fetch_blob()
            .withf(|url| url == "blob:http://localhost/abc")
            .returning(|_| Ok(Bytes::from_static(b"hello")));
        let web = WebEncoding::new(Arc::new(resolver));

        let stored = web
            .encode_for_store(&RawAsset::web("blob:http://localhost/abc", ImageFormat::Jpeg))
            .await
            .unwrap();
        assert_eq!(stored, Bytes::from_static(b"aGVsbG8="));
        assert_eq!(web.decode_payload(stored.clone()).unwrap(), Bytes::from_static(b"hello"));

        let mut store = MockStore::new();
        store
            .expect_read()
            .withf(|key| key == "1.jpeg")
            .returning(move |_| Ok(stored.clone()));
        let uri = web
            .decode_for_display(&PhotoRecord::new("1.jpeg", "1.jpeg"), &store)
            .await
            .unwrap();
        assert_eq!(uri, "data:image/jpeg;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_web_fetch_failure_is_encoding_error() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_fetch_blob()
            .returning(|url| Err(BridgeError::NotFound(url.to_string())));
        let web = WebEncoding::new(Arc::new(resolver));

        let err = web
            .encode_for_store(&RawAsset::web("blob:gone", ImageFormat::Png))
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Encoding(_)));
    }

    #[test]
    fn test_web_mime_and_paths() {
        assert_eq!(WebEncoding::mime_for("1.png"), "image/png");
        assert_eq!(WebEncoding::mime_for("1.jpg"), "image/jpeg");
        assert_eq!(WebEncoding::mime_for("1.bin"), FALLBACK_MIME);

        let web = WebEncoding::new(Arc::new(MockResolver::new()));
        assert_eq!(web.record_filepath("1.png", "/data/photos/1.png"), "1.png");
        assert!(web.decode_payload(Bytes::from_static(b"%%%")).is_err());
    }

    #[test]
    fn test_strategy_selection() {
        let fs: Arc<dyn FileSystemAccess> = Arc::new(MockFileSystem::new());

        let native = strategy_for(Platform::NativeHybrid, fs.clone(), None, "http://localhost")
            .unwrap();
        assert_eq!(native.platform(), Platform::NativeHybrid);

        assert!(strategy_for(Platform::Web, fs.clone(), None, "http://localhost").is_err());

        let resolver: Arc<dyn BlobResolver> = Arc::new(MockResolver::new());
        let web = strategy_for(Platform::Web, fs, Some(resolver), "http://localhost").unwrap();
        assert_eq!(web.platform(), Platform::Web);
    }
}
