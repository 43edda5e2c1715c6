//! # Core Runtime Module
//!
//! Runtime plumbing shared by the photo gallery crates:
//! - Logging and tracing setup (`logging`)
//! - Capability wiring and validation (`config`)
//! - Broadcast event bus (`events`)
//!
//! Nothing here knows about photos beyond the event payloads; the library
//! itself lives in `core-gallery`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
