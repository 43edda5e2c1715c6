//! Camera capture delegated to a host-provided JavaScript function.
//!
//! The host shell passes a function shaped like
//!
//! ```javascript
//! async (request) => {
//!   // request = { result_type: "uri", source: "photos", quality: 100 }
//!   const photo = await Camera.getPhoto({ ... });
//!   return { webPath: photo.webPath, format: photo.format };
//! }
//! ```
//!
//! A rejection whose message mentions "cancel" is reported as a cancelled
//! capture; any other rejection means capture is not available.

use async_trait::async_trait;
use bridge_traits::{
    capture::{CameraCapture, CaptureRequest, ImageFormat, RawAsset},
    error::{BridgeError, Result as BridgeResult},
};
use js_sys::{Function, Promise};
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::js_message;

#[derive(Debug, Deserialize)]
struct CapturedPhoto {
    #[serde(rename = "webPath")]
    web_path: String,
    format: String,
}

/// `CameraCapture` backed by a JS callback returning a Promise.
pub struct JsCameraCapture {
    callback: Function,
}

impl JsCameraCapture {
    /// Wrap the host capture callback.
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

fn classify_rejection(err: JsValue) -> BridgeError {
    let message = js_message(&err);
    if message.to_ascii_lowercase().contains("cancel") {
        BridgeError::Cancelled(message)
    } else {
        BridgeError::NotAvailable(message)
    }
}

#[async_trait(?Send)]
impl CameraCapture for JsCameraCapture {
    async fn capture(&self, request: &CaptureRequest) -> BridgeResult<RawAsset> {
        let js_request = serde_wasm_bindgen::to_value(request)
            .map_err(|e| BridgeError::OperationFailed(format!("encode capture request: {e}")))?;

        let returned = self
            .callback
            .call1(&JsValue::NULL, &js_request)
            .map_err(classify_rejection)?;

        let value = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(classify_rejection)?,
            Err(value) => value,
        };

        if value.is_null() || value.is_undefined() {
            return Err(BridgeError::Cancelled("capture returned no photo".into()));
        }

        let photo: CapturedPhoto = serde_wasm_bindgen::from_value(value)
            .map_err(|e| BridgeError::OperationFailed(format!("decode capture result: {e}")))?;

        let format = ImageFormat::from_extension(&photo.format).ok_or_else(|| {
            BridgeError::OperationFailed(format!("unsupported image format '{}'", photo.format))
        })?;

        tracing::debug!(format = %format, "Captured photo from host");
        Ok(RawAsset::web(photo.web_path, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::capture::AssetSource;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn returns_web_asset_from_callback() {
        let callback = Function::new_with_args(
            "request",
            "return Promise.resolve({ webPath: 'blob:test/1', format: 'jpeg' });",
        );
        let camera = JsCameraCapture::new(callback);

        let asset = camera.capture(&CaptureRequest::default()).await.expect("capture");
        assert_eq!(asset.source, AssetSource::WebBlob("blob:test/1".to_string()));
        assert_eq!(asset.format, ImageFormat::Jpeg);
    }

    #[wasm_bindgen_test]
    async fn cancelled_rejection_maps_to_cancelled() {
        let callback = Function::new_with_args(
            "request",
            "return Promise.reject(new Error('User cancelled photos app'));",
        );
        let camera = JsCameraCapture::new(callback);

        let err = camera.capture(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Cancelled(_)));
    }

    #[wasm_bindgen_test]
    async fn other_rejection_maps_to_not_available() {
        let callback = Function::new_with_args(
            "request",
            "return Promise.reject(new Error('Camera not present'));",
        );
        let camera = JsCameraCapture::new(callback);

        let err = camera.capture(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }
}
