//! # Core Gallery
//!
//! Local photo library: an ordered, most-recent-first collection of photos
//! whose bytes live in a [`BinaryStore`] and whose order lives in a
//! [`MetadataIndex`].
//!
//! ## Components
//!
//! - [`store`]: filename-keyed blob storage over a host filesystem bridge
//! - [`index`]: whole-snapshot JSON index in the host settings store
//! - [`encoding`]: native and web strategies for stored bytes and display URIs
//! - [`manager`]: [`LibraryManager`], the orchestrator the UI talks to
//!
//! Capture goes through [`bridge_traits::CameraCapture`]; cancelled or
//! unavailable captures are a no-op, never an error.

pub mod encoding;
pub mod error;
pub mod index;
pub mod manager;
pub mod models;
pub mod store;

pub use encoding::{strategy_for, EncodingStrategy, NativeEncoding, WebEncoding};
pub use error::{GalleryError, Result};
pub use index::{MetadataIndex, SettingsMetadataIndex};
pub use manager::LibraryManager;
pub use models::{DeleteOutcome, LibraryConfig, LibraryState, PhotoRecord};
pub use store::{BinaryStore, FsBinaryStore};
