//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement for the photo
//! library core.
//!
//! ## Traits
//!
//! ### Storage
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Byte storage in the app data area
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value store holding the photo index
//!
//! ### Capture
//! - [`CameraCapture`](capture::CameraCapture) - One-shot camera / photo library picker
//! - [`BlobResolver`](capture::BlobResolver) - Turns session-scoped blob URLs into bytes (web only)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source, used to name captured photos
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform      | Implementation Crate | Filesystem | Settings     | Capture            |
//! |---------------|----------------------|------------|--------------|--------------------|
//! | Desktop       | `bridge-desktop`     | tokio fs   | SQLite       | external program   |
//! | Web           | `bridge-wasm`        | IndexedDB  | localStorage | host JS callback   |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! let camera = config.camera
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "CameraCapture".to_string(),
//!         message: "No camera bridge provided. Inject a platform capture adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map "user dismissed" to `Cancelled`, "capability absent" to
//! `NotAvailable` and "no such file" to `NotFound`.
//!
//! ## Thread Safety
//!
//! Traits are bounded by [`PlatformSendSync`](platform::PlatformSendSync):
//! `Send + Sync` on native targets and unbounded on `wasm32`.

pub mod capture;
pub mod error;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use capture::{
    AssetSource, BlobResolver, CameraCapture, CaptureRequest, CaptureResultType, CaptureSource,
    ImageFormat, RawAsset,
};
pub use platform::{Platform, PlatformSendSync};
pub use storage::{FileSystemAccess, SettingsStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
