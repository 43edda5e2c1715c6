//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct the filesystem,
//! settings, blob and capture adapters in one call. The result plays the role
//! `bridge-desktop` plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    capture::{BlobResolver, CameraCapture},
    error::{BridgeError, Result as BridgeResult},
    storage::{FileSystemAccess, SettingsStore},
};
use js_sys::Function;

use crate::{
    blob::WasmBlobResolver, capture::JsCameraCapture, filesystem::WasmFileSystem,
    storage::WasmSettingsStore,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Logical namespace used for storage buckets (IndexedDB, localStorage).
    pub namespace: String,
    /// Host function performing the actual capture.
    pub capture: Option<Function>,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            capture: None,
        }
    }

    /// Provide the JS capture callback.
    pub fn with_capture(mut self, callback: Function) -> Self {
        self.capture = Some(callback);
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("photo-gallery")
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// IndexedDB-backed filesystem implementation.
    pub filesystem: Arc<dyn FileSystemAccess>,
    /// Plain settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// `fetch`-based blob URL resolver.
    pub blob_resolver: Arc<dyn BlobResolver>,
    /// Capture adapter, present when the host supplied a callback.
    pub camera: Option<Arc<dyn CameraCapture>>,
}

/// Build the default wasm bridge stack.
///
/// Hosts call this during startup and pass the returned trait objects into
/// `core-service`.
pub async fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let filesystem: Arc<dyn FileSystemAccess> = Arc::new(
        WasmFileSystem::new(&config.namespace)
            .await
            .map_err(BridgeError::from)?,
    );
    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(WasmSettingsStore::new(&config.namespace)?);
    let blob_resolver: Arc<dyn BlobResolver> = Arc::new(WasmBlobResolver::new()?);
    let camera = config
        .capture
        .map(|callback| Arc::new(JsCameraCapture::new(callback)) as Arc<dyn CameraCapture>);

    Ok(WasmBridgeSet {
        filesystem,
        settings_store,
        blob_resolver,
        camera,
    })
}
