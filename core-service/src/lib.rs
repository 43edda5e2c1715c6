//! Gallery service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges from a validated
//! [`CoreConfig`] into a ready-to-use photo library. Desktop apps typically
//! enable the `desktop-shims` feature (defaults from `bridge-desktop`), whereas
//! WebAssembly builds enable the `wasm` feature and rely on the adapters from
//! `bridge-wasm`.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .data_dir(data_dir)
//!     .camera(camera)
//!     .build()?;
//! let service = GalleryService::new(config, LibraryConfig::default()).await?;
//! service.initialize().await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::Platform;
use bytes::Bytes;
use core_gallery::{
    strategy_for, DeleteOutcome, FsBinaryStore, LibraryConfig, LibraryManager, LibraryState,
    PhotoRecord, SettingsMetadataIndex,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, Receiver};
use core_runtime::logging::LoggingConfig;
use tracing::info;

#[cfg(feature = "wasm")]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(feature = "wasm")]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct GalleryService {
    platform: Platform,
    library: Arc<LibraryManager>,
    event_bus: EventBus,
}

impl GalleryService {
    /// Build the library from a validated config.
    ///
    /// The encoding strategy is chosen here, once, from `config.platform`.
    pub async fn new(config: CoreConfig, library_config: LibraryConfig) -> Result<Self> {
        config.validate()?;
        library_config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let store = FsBinaryStore::open(
            config.file_system.clone(),
            &library_config.store_namespace,
        )
        .await?;
        let index = SettingsMetadataIndex::new(
            config.settings_store.clone(),
            library_config.storage_key.clone(),
        );
        let encoding = strategy_for(
            config.platform,
            config.file_system.clone(),
            config.blob_resolver.clone(),
            &library_config.webview_origin,
        )?;

        let library = LibraryManager::new(
            library_config,
            Arc::new(store),
            Arc::new(index),
            config.camera.clone(),
            encoding,
            config.clock.clone(),
        )
        .with_event_bus(event_bus.clone());

        info!(platform = %config.platform, "Gallery service created");

        Ok(Self {
            platform: config.platform,
            library: Arc::new(library),
            event_bus,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The underlying manager, for hosts that want to hold it directly.
    pub fn library(&self) -> Arc<LibraryManager> {
        Arc::clone(&self.library)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Library and capture events, optionally filtered by the caller.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub async fn initialize(&self) -> Result<()> {
        Ok(self.library.initialize().await?)
    }

    pub async fn state(&self) -> LibraryState {
        self.library.state().await
    }

    pub async fn photos(&self) -> Vec<PhotoRecord> {
        self.library.photos().await
    }

    pub async fn add_photo(&self) -> Result<Option<PhotoRecord>> {
        Ok(self.library.add_photo().await?)
    }

    pub async fn delete_photo(&self, record: &PhotoRecord) -> Result<DeleteOutcome> {
        Ok(self.library.delete_photo(record).await?)
    }

    pub async fn reclaim_orphans(&self) -> Result<Vec<String>> {
        Ok(self.library.reclaim_orphans().await?)
    }

    pub async fn read_photo_bytes(&self, record: &PhotoRecord) -> Result<Bytes> {
        Ok(self.library.read_photo_bytes(record).await?)
    }
}

/// Logging setup that forwards to the host sink carried by `config`, if any.
pub fn logging_config(config: &CoreConfig) -> LoggingConfig {
    let logging = LoggingConfig::default();
    match &config.logger_sink {
        Some(sink) => logging.with_logger_sink(Arc::clone(sink)),
        None => logging,
    }
}

/// Desktop bootstrap: default filesystem and settings under `data_dir`.
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    data_dir: impl Into<std::path::PathBuf>,
    camera: Arc<dyn bridge_traits::CameraCapture>,
    library_config: LibraryConfig,
) -> Result<GalleryService> {
    let config = CoreConfig::builder()
        .data_dir(data_dir)
        .platform(Platform::NativeHybrid)
        .camera(camera)
        .build()?;
    GalleryService::new(config, library_config).await
}

#[cfg(feature = "wasm")]
fn wasm_config(bridges: WasmBridgeSet) -> Result<CoreConfig> {
    let mut builder = CoreConfig::builder()
        .data_dir("/data")
        .platform(Platform::Web)
        .file_system(bridges.filesystem)
        .settings_store(bridges.settings_store)
        .blob_resolver(bridges.blob_resolver);
    if let Some(camera) = bridges.camera {
        builder = builder.camera(camera);
    }
    Ok(builder.build()?)
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```ignore
/// # async fn example(capture: js_sys::Function) -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
/// use core_gallery::LibraryConfig;
///
/// let config = WasmBridgeConfig::new("photo-gallery").with_capture(capture);
/// let gallery = bootstrap_wasm(config, LibraryConfig::default()).await?;
/// gallery.initialize().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "wasm")]
pub async fn bootstrap_wasm(
    config: WasmBridgeConfig,
    library_config: LibraryConfig,
) -> Result<GalleryService> {
    let bridges = build_wasm_bridges(config)
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    GalleryService::new(wasm_config(bridges)?, library_config).await
}
