//! # Core Configuration Module
//!
//! Builder-based configuration holding every host bridge the photo library
//! needs, validated fail-fast before anything touches storage.
//!
//! ## Required Dependencies
//!
//! - `CameraCapture` - no default on any platform
//! - `FileSystemAccess` - desktop default: `TokioFileSystem` rooted at `data_dir`
//! - `SettingsStore` - desktop default: `SqliteSettingsStore` at `data_dir/settings.db`
//! - `BlobResolver` - required only when the platform is [`Platform::Web`]
//!
//! ## Optional Dependencies
//!
//! - `Clock` - defaults to [`SystemClock`]
//! - `LoggerSink` - host log forwarding
//!
//! Desktop defaults are only injected when the `desktop-shims` feature is on.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .data_dir("/home/ana/.local/share/photo-gallery")
//!     .camera(Arc::new(CommandCameraCapture::new("gallery-capture", ["{output}"])))
//!     .build()?;
//! ```
//!
//! Missing capabilities surface as [`Error::CapabilityMissing`] with a message
//! telling the host what to inject.

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    BlobResolver, CameraCapture, Clock, FileSystemAccess, LoggerSink, Platform, SettingsStore,
    SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Core configuration for the photo library.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root for app-private data (settings database, desktop photo store)
    pub data_dir: PathBuf,

    /// Runtime family; selects the encoding strategy
    pub platform: Platform,

    pub file_system: Arc<dyn FileSystemAccess>,

    /// Durable key-value store that holds the photo index
    pub settings_store: Arc<dyn SettingsStore>,

    pub camera: Arc<dyn CameraCapture>,

    /// Blob URL resolver (web only)
    pub blob_resolver: Option<Arc<dyn BlobResolver>>,

    pub clock: Arc<dyn Clock>,

    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Capacity of the event broadcast channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("platform", &self.platform)
            .field("file_system", &"FileSystemAccess { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("camera", &"CameraCapture { ... }")
            .field(
                "blob_resolver",
                &self.blob_resolver.as_ref().map(|_| "BlobResolver { ... }"),
            )
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// Checks that the data directory is set, the event buffer is non-empty
    /// and a blob resolver is present on the web.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.platform == Platform::Web && self.blob_resolver.is_none() {
            return Err(blob_resolver_missing_error());
        }

        Ok(())
    }
}

fn camera_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "CameraCapture".to_string(),
        message: "CameraCapture implementation is required to add photos. \
                 Desktop: inject CommandCameraCapture pointing at a capture program. \
                 Web: pass a capture callback to build_wasm_bridges."
            .to_string(),
    }
}

fn blob_resolver_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "BlobResolver".to_string(),
        message: "Web platform captures return blob URLs; a BlobResolver is required to read them. \
                 Inject WasmBlobResolver from bridge-wasm."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_data_dir: &std::path::Path) -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required for photo storage. \
                 Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
                 Web: inject WasmFileSystem."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(data_dir: &std::path::Path) -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs: Arc<dyn FileSystemAccess> =
        Arc::new(TokioFileSystem::with_data_directory(data_dir.to_path_buf()));
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(
    _data_dir: &std::path::Path,
) -> Result<Arc<dyn SettingsStore>> {
    Err(Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for the photo index. \
                 Desktop: enable the 'desktop-shims' feature to use SqliteSettingsStore. \
                 Web: inject WasmSettingsStore (localStorage)."
            .to_string(),
    })
}

/// Opens the default SQLite settings store.
///
/// The builder is synchronous, so the store is opened on a private runtime.
/// Inside an existing runtime that work moves to a helper thread because
/// `block_on` cannot nest.
#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(data_dir: &std::path::Path) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let path = data_dir.join("settings.db");

    let open = move || -> Result<SqliteSettingsStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::BridgeInit(format!(
                    "Failed to create runtime for default settings store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| Error::BridgeInit(format!("Failed to open default SettingsStore: {}", e)))
    };

    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(open).join().map_err(|_| {
            Error::BridgeInit("Settings store initialization thread panicked".to_string())
        })??,
        Err(_) => open()?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    data_dir: Option<PathBuf>,
    platform: Option<Platform>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    camera: Option<Arc<dyn CameraCapture>>,
    blob_resolver: Option<Arc<dyn BlobResolver>>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the app-private data directory.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().data_dir("/tmp/photo-gallery");
    /// ```
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Overrides platform detection. Defaults to [`Platform::current`].
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the capture adapter (required).
    pub fn camera(mut self, camera: Arc<dyn CameraCapture>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn blob_resolver(mut self, resolver: Arc<dyn BlobResolver>) -> Self {
        self.blob_resolver = Some(resolver);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig`.
    ///
    /// Fails when:
    /// - `data_dir` was not set
    /// - a required bridge is missing and no desktop default applies
    /// - validation rejects the assembled config
    pub fn build(self) -> Result<CoreConfig> {
        let data_dir = self.data_dir.ok_or_else(|| {
            Error::Config("Data directory is required. Use .data_dir() to set it.".to_string())
        })?;

        let camera = self.camera.ok_or_else(camera_missing_error)?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(&data_dir)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(&data_dir)?,
        };

        let config = CoreConfig {
            data_dir,
            platform: self.platform.unwrap_or_else(Platform::current),
            file_system,
            settings_store,
            camera,
            blob_resolver: self.blob_resolver,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
