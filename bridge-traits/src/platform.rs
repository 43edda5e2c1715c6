//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target, plus the runtime discriminant the
//! core uses to pick its encoding strategy.
//!
//! Native targets require `Send + Sync` to allow bridge implementations to be
//! shared freely across async tasks. WebAssembly builds, however, run entirely
//! on a single thread and cannot satisfy those bounds because browser-provided
//! objects (e.g., `web_sys` types) are not thread-safe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Runtime family the core is hosted in.
///
/// - `NativeHybrid`: a webview shell with real filesystem access. Captured
///   assets arrive as native paths.
/// - `Web`: a plain browser tab. Captured assets arrive as transient blob URLs
///   and storage can only hold text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    NativeHybrid,
    Web,
}

impl Platform {
    /// Platform of the current compilation target.
    pub const fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::NativeHybrid
        }
    }

    pub fn is_web(&self) -> bool {
        matches!(self, Platform::Web)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::NativeHybrid => write!(f, "native-hybrid"),
            Platform::Web => write!(f, "web"),
        }
    }
}
