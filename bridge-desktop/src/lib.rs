//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux).
//!
//! - `FileSystemAccess` using `tokio::fs`, with `sync_all` on every write
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `CameraCapture` delegating to an external capture program
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{CommandCameraCapture, SqliteSettingsStore, TokioFileSystem};
//!
//! #[tokio::main]
//! async fn main() {
//!     let fs = TokioFileSystem::new();
//!     let settings = SqliteSettingsStore::new(fs.data_dir().join("settings.db")).await?;
//!     let camera = CommandCameraCapture::new("gallery-capture", ["--out", "{output}"]);
//!     // Hand these to CoreConfig::builder()
//! }
//! ```

mod capture;
mod filesystem;
mod settings;

pub use capture::CommandCameraCapture;
pub use filesystem::TokioFileSystem;
pub use settings::SqliteSettingsStore;
