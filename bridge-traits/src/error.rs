use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation cancelled: {0}")]
    Cancelled(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` when the error signals an absent resource rather than a
    /// failed operation. I/O errors of kind `NotFound` count as well.
    pub fn is_not_found(&self) -> bool {
        match self {
            BridgeError::NotFound(_) => true,
            BridgeError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(BridgeError::NotFound("photos/1.jpeg".into()).is_not_found());
        assert!(
            BridgeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).is_not_found()
        );
        assert!(!BridgeError::OperationFailed("disk full".into()).is_not_found());
        assert!(!BridgeError::Cancelled("dismissed".into()).is_not_found());
    }
}
