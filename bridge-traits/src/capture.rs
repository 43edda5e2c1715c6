//! Camera Capture Abstractions
//!
//! The core never talks to a camera directly. Hosts inject a [`CameraCapture`]
//! that performs one-shot captures and reports what it produced as a
//! [`RawAsset`]. On the web the asset is a transient blob URL, so hosts also
//! provide a [`BlobResolver`] to pull the bytes out before the URL is revoked.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::{
    error::Result,
    platform::{Platform, PlatformSendSync},
};

/// Image encoding of a captured asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Heic,
}

impl ImageFormat {
    /// File extension used when naming stored photos.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Heic => "heic",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// Parse a format tag or file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            "heic" | "heif" => Some(ImageFormat::Heic),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How the host should hand the captured image back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureResultType {
    /// A URI or path referencing the image
    #[default]
    Uri,
    /// A native filesystem path
    Path,
}

/// Where the image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Camera,
    /// The device photo library
    #[default]
    Photos,
    /// Let the user choose between camera and library
    Prompt,
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Camera => write!(f, "camera"),
            CaptureSource::Photos => write!(f, "photos"),
            CaptureSource::Prompt => write!(f, "prompt"),
        }
    }
}

/// One-shot capture request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub result_type: CaptureResultType,
    pub source: CaptureSource,
    /// Encoder quality, 0 to 100
    pub quality: u8,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            result_type: CaptureResultType::Uri,
            source: CaptureSource::Photos,
            quality: 100,
        }
    }
}

/// Opaque handle to captured image data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AssetSource {
    /// File written by the native camera
    NativePath(PathBuf),
    /// Browser blob URL, valid for the current session only
    WebBlob(String),
}

/// Result of a successful capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAsset {
    pub source: AssetSource,
    pub format: ImageFormat,
    pub platform: Platform,
}

impl RawAsset {
    pub fn native(path: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            source: AssetSource::NativePath(path.into()),
            format,
            platform: Platform::NativeHybrid,
        }
    }

    pub fn web(blob_url: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            source: AssetSource::WebBlob(blob_url.into()),
            format,
            platform: Platform::Web,
        }
    }
}

/// Camera capture trait
///
/// Implementations must fail with
/// [`BridgeError::Cancelled`](crate::error::BridgeError::Cancelled) when the
/// user dismisses the capture UI without choosing an image, and with
/// [`BridgeError::NotAvailable`](crate::error::BridgeError::NotAvailable) when
/// no capture capability exists on the host.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::capture::{CameraCapture, CaptureRequest};
///
/// async fn snap(camera: &dyn CameraCapture) -> Result<RawAsset> {
///     camera.capture(&CaptureRequest::default()).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CameraCapture: PlatformSendSync {
    async fn capture(&self, request: &CaptureRequest) -> Result<RawAsset>;

    /// Free whatever the adapter staged for `asset`.
    ///
    /// Called once the caller has copied the asset's bytes, whether or not
    /// the copy succeeded. The default does nothing.
    async fn release(&self, _asset: &RawAsset) -> Result<()> {
        Ok(())
    }
}

/// Resolves a session-scoped blob URL into its bytes.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait BlobResolver: PlatformSendSync {
    async fn fetch_blob(&self, url: &str) -> Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("tiff"), None);
    }

    #[test]
    fn test_format_mime_type() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
    }

    #[test]
    fn test_default_request_matches_library_picker() {
        let request = CaptureRequest::default();
        assert_eq!(request.result_type, CaptureResultType::Uri);
        assert_eq!(request.source, CaptureSource::Photos);
        assert_eq!(request.quality, 100);
    }

    #[test]
    fn test_raw_asset_constructors_tag_platform() {
        let native = RawAsset::native("/tmp/cap.jpeg", ImageFormat::Jpeg);
        assert_eq!(native.platform, Platform::NativeHybrid);

        let web = RawAsset::web("blob:http://localhost/abc", ImageFormat::Png);
        assert_eq!(web.platform, Platform::Web);
        assert_eq!(
            web.source,
            AssetSource::WebBlob("blob:http://localhost/abc".to_string())
        );
    }

    struct FixedCamera;

    #[async_trait::async_trait]
    impl CameraCapture for FixedCamera {
        async fn capture(&self, _request: &CaptureRequest) -> Result<RawAsset> {
            Ok(RawAsset::native("/tmp/cap.jpeg", ImageFormat::Jpeg))
        }
    }

    #[tokio::test]
    async fn test_default_release_is_a_no_op() {
        let camera = FixedCamera;
        let asset = camera.capture(&CaptureRequest::default()).await.unwrap();
        assert!(camera.release(&asset).await.is_ok());
    }

    #[test]
    fn test_asset_serialization_shape() {
        let asset = RawAsset::web("blob:x", ImageFormat::Jpeg);
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["source"]["kind"], "web_blob");
        assert_eq!(json["format"], "jpeg");
        assert_eq!(json["platform"], "web");
    }
}
