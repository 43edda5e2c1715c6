//! Errors raised while assembling the runtime.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// A host bridge was not injected and has no default on this platform
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A default bridge could not be opened
    #[error("Bridge initialization failed: {0}")]
    BridgeInit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
