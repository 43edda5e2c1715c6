//! `localStorage`-backed settings store.
//!
//! Keys are namespaced as `{namespace}::settings::{key}` so several host
//! shells can share one origin. `localStorage.setItem` replaces a value in one
//! synchronous step, which is what the photo index relies on.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::SettingsStore,
};
use tracing::debug;

use crate::error::js_error;

const SETTINGS_PREFIX: &str = "settings";

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

fn scoped_key(namespace: &str, kind: &str, key: &str) -> String {
    format!("{namespace}::{kind}::{key}")
}

/// Plain settings store layered on `localStorage`.
#[derive(Clone)]
pub struct WasmSettingsStore {
    storage: web_sys::Storage,
    namespace: String,
}

impl WasmSettingsStore {
    /// Construct a new settings store scoped to the provided namespace.
    pub fn new(namespace: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            namespace: namespace.into(),
        })
    }

    fn key_for(&self, key: &str) -> String {
        scoped_key(&self.namespace, SETTINGS_PREFIX, key)
    }

    fn prefix(&self) -> String {
        scoped_key(&self.namespace, SETTINGS_PREFIX, "")
    }
}

#[async_trait(?Send)]
impl SettingsStore for WasmSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("set setting", err))?;
        debug!(key = key, size = value.len(), "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get setting", err))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove setting", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let prefix = self.prefix();
        let len = self
            .storage
            .length()
            .map_err(|err| js_error("storage length", err))?;

        let mut keys = Vec::new();
        for idx in 0..len {
            if let Some(entry) = self
                .storage
                .key(idx)
                .map_err(|err| js_error("storage key", err))?
            {
                if let Some(key) = entry.strip_prefix(&prefix) {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
