//! Domain models for the photo library

use crate::error::{GalleryError, Result};
use bridge_traits::capture::CaptureRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings key holding the serialized library.
pub const DEFAULT_STORAGE_KEY: &str = "photos";
/// Directory under the app data area that holds photo bytes.
pub const DEFAULT_STORE_NAMESPACE: &str = "photos";
/// Origin the webview serves local files from.
pub const DEFAULT_WEBVIEW_ORIGIN: &str = "http://localhost";

/// One captured photo.
///
/// Only `filename` and `filepath` are persisted. `display_uri` is rebuilt every
/// session because blob URLs and converted file URIs do not survive a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Unique id and Binary Store key, `<millis>.<ext>`
    pub filename: String,
    /// Backend location of the payload (native path, or the filename on web)
    pub filepath: String,
    #[serde(skip)]
    pub display_uri: String,
}

impl PhotoRecord {
    pub fn new(filename: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            filepath: filepath.into(),
            display_uri: String::new(),
        }
    }

    pub fn with_display_uri(mut self, uri: impl Into<String>) -> Self {
        self.display_uri = uri.into();
        self
    }

    /// File extension of the stored photo, if any.
    pub fn extension(&self) -> Option<&str> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Library lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryState {
    Unloaded,
    Ready,
}

impl fmt::Display for LibraryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryState::Unloaded => write!(f, "unloaded"),
            LibraryState::Ready => write!(f, "ready"),
        }
    }
}

/// What `delete_photo` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Removed from the library and the store.
    Removed,
    /// The record was not in the library. Nothing changed.
    NotPresent,
    /// Removed from the library, but its bytes are still in the store.
    Orphaned,
}

/// Per-library settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub storage_key: String,
    pub store_namespace: String,
    pub capture: CaptureRequest,
    pub webview_origin: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            store_namespace: DEFAULT_STORE_NAMESPACE.to_string(),
            capture: CaptureRequest::default(),
            webview_origin: DEFAULT_WEBVIEW_ORIGIN.to_string(),
        }
    }
}

impl LibraryConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_store_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.store_namespace = namespace.into();
        self
    }

    pub fn with_capture(mut self, capture: CaptureRequest) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_webview_origin(mut self, origin: impl Into<String>) -> Self {
        self.webview_origin = origin.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(GalleryError::invalid_input(
                "storage_key",
                "Storage key cannot be empty",
            ));
        }

        if self.store_namespace.is_empty()
            || self.store_namespace.contains(['/', '\\'])
            || self.store_namespace.contains("..")
        {
            return Err(GalleryError::invalid_input(
                "store_namespace",
                "Namespace must be a single directory name",
            ));
        }

        if self.capture.quality > 100 {
            return Err(GalleryError::invalid_input(
                "capture.quality",
                format!("Quality must be 0-100, got {}", self.capture.quality),
            ));
        }

        if !self.webview_origin.contains("://") {
            return Err(GalleryError::invalid_input(
                "webview_origin",
                "Origin must include a scheme, e.g. http://localhost",
            ));
        }

        Ok(())
    }
}
