use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Capture cancelled: {0}")]
    CaptureCancelled(String),

    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Failed to write photo {key}: {source}")]
    StoreWriteFailed {
        key: String,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to read photo {key}: {source}")]
    StoreReadFailed {
        key: String,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to delete photo {key}: {source}")]
    StoreDeleteFailed {
        key: String,
        #[source]
        source: BridgeError,
    },

    #[error("Photo index is corrupt: {0}")]
    IndexCorrupt(String),

    #[error("Failed to read photo index: {0}")]
    IndexReadFailed(#[source] BridgeError),

    #[error("Failed to write photo index: {0}")]
    IndexWriteFailed(#[source] BridgeError),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Library is not initialized")]
    NotReady,

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl GalleryError {
    /// `true` when a store read failed because the blob does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            GalleryError::StoreReadFailed { source, .. } => source.is_not_found(),
            GalleryError::Bridge(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Maps a capture bridge failure onto the capture error kinds.
    pub fn from_capture(err: BridgeError) -> Self {
        match err {
            BridgeError::Cancelled(msg) => GalleryError::CaptureCancelled(msg),
            BridgeError::NotAvailable(msg) => GalleryError::CaptureUnavailable(msg),
            other => GalleryError::Bridge(other),
        }
    }

    pub(crate) fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        GalleryError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let missing = GalleryError::StoreReadFailed {
            key: "1.jpeg".into(),
            source: BridgeError::NotFound("1.jpeg".into()),
        };
        assert!(missing.is_not_found());

        let io_missing = GalleryError::StoreReadFailed {
            key: "1.jpeg".into(),
            source: BridgeError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)),
        };
        assert!(io_missing.is_not_found());

        let denied = GalleryError::StoreReadFailed {
            key: "1.jpeg".into(),
            source: BridgeError::OperationFailed("permission denied".into()),
        };
        assert!(!denied.is_not_found());
        assert!(!GalleryError::NotReady.is_not_found());
    }

    #[test]
    fn test_capture_error_mapping() {
        assert!(matches!(
            GalleryError::from_capture(BridgeError::Cancelled("dismissed".into())),
            GalleryError::CaptureCancelled(_)
        ));
        assert!(matches!(
            GalleryError::from_capture(BridgeError::NotAvailable("no camera".into())),
            GalleryError::CaptureUnavailable(_)
        ));
        assert!(matches!(
            GalleryError::from_capture(BridgeError::OperationFailed("boom".into())),
            GalleryError::Bridge(_)
        ));
    }
}
