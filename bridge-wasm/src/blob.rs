//! Blob URL resolution through the browser's `fetch` API.
//!
//! Captured images on the web arrive as `blob:` URLs that die with the page.
//! Fetching them yields the raw bytes, which the core then encodes for
//! storage.

use async_trait::async_trait;
use bridge_traits::{
    capture::BlobResolver,
    error::{BridgeError, Result as BridgeResult},
};
use bytes::Bytes;
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use crate::error::js_error;

/// Fetches blob (or any same-origin) URLs into memory.
pub struct WasmBlobResolver {
    window: Window,
}

impl WasmBlobResolver {
    /// Create a resolver bound to the current browser window.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".to_string()))?;
        Ok(Self { window })
    }

    async fn read_body(response: &Response) -> BridgeResult<Bytes> {
        let promise = response
            .array_buffer()
            .map_err(|err| js_error("response.array_buffer", err))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|err| js_error("response buffer", err))?;
        let array = Uint8Array::new(&buffer);
        let mut bytes = vec![0u8; array.length() as usize];
        array.copy_to(&mut bytes);
        Ok(Bytes::from(bytes))
    }
}

#[async_trait(?Send)]
impl BlobResolver for WasmBlobResolver {
    async fn fetch_blob(&self, url: &str) -> BridgeResult<Bytes> {
        let value = JsFuture::from(self.window.fetch_with_str(url))
            .await
            .map_err(|err| js_error("fetch blob", err))?;
        let response = value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch returned non-Response".into()))?;

        if !response.ok() {
            return Err(BridgeError::NotFound(format!(
                "{url} (status {})",
                response.status()
            )));
        }

        let bytes = Self::read_body(&response).await?;
        tracing::debug!(size = bytes.len(), "Resolved blob URL");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;
    use web_sys::{Blob, Url};

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn resolves_object_url_bytes() {
        let payload = Uint8Array::from(&b"0123456789"[..]);
        let parts = js_sys::Array::of1(&JsValue::from(payload));
        let blob = Blob::new_with_u8_array_sequence(&parts).expect("blob");
        let url = Url::create_object_url_with_blob(&blob).expect("object url");

        let resolver = WasmBlobResolver::new().expect("resolver");
        let bytes = resolver.fetch_blob(&url).await.expect("fetch");
        assert_eq!(bytes.as_ref(), b"0123456789");

        Url::revoke_object_url(&url).ok();
    }
}
