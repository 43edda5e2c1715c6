//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the bridge traits defined in `bridge-traits`,
//! built on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate targets `wasm32-unknown-unknown` only. It compiles to nothing on
//! native targets.
//!
//! # Implementations
//!
//! - `WasmFileSystem`: IndexedDB-based file storage
//! - `WasmSettingsStore`: `localStorage` key-value settings
//! - `WasmBlobResolver`: `fetch` of session blob URLs
//! - `JsCameraCapture`: capture through a host JS callback
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(
//!     WasmBridgeConfig::new("my-gallery").with_capture(capture_fn),
//! )
//! .await?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod blob;
pub mod bootstrap;
pub mod capture;
pub mod error;
pub mod filesystem;
pub mod storage;

pub use blob::WasmBlobResolver;
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use capture::JsCameraCapture;
pub use error::{WasmError, WasmResult};
pub use filesystem::WasmFileSystem;
pub use storage::WasmSettingsStore;
