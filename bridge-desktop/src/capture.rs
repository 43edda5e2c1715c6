//! Camera capture through an external program
//!
//! Desktop hosts rarely have a camera API the core can call directly, so the
//! capture step is delegated to a configurable command (a webcam grabber, a
//! file picker script, a hybrid shell's native helper). The command receives
//! the path it must write to and signals success with a zero exit status.

use async_trait::async_trait;
use bridge_traits::{
    capture::{AssetSource, CameraCapture, CaptureRequest, ImageFormat, RawAsset},
    error::{BridgeError, Result},
};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs a capture program and returns the file it produced.
///
/// Arguments may contain these placeholders:
/// - `{output}`: absolute path the program must write the image to
/// - `{quality}`: requested quality, 0 to 100
/// - `{source}`: `camera`, `photos` or `prompt`
///
/// Exit status mapping:
/// - program cannot be spawned: `NotAvailable`
/// - non-zero exit, or no/empty output file: `Cancelled`
///
/// The staged output file belongs to this adapter until [`CameraCapture::release`]
/// removes it.
#[derive(Debug, Clone)]
pub struct CommandCameraCapture {
    program: String,
    args: Vec<String>,
    capture_dir: PathBuf,
    format: ImageFormat,
}

impl CommandCameraCapture {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            capture_dir: std::env::temp_dir().join("photo-gallery-captures"),
            format: ImageFormat::Jpeg,
        }
    }

    /// Directory where capture output files are staged
    pub fn with_capture_dir(mut self, dir: PathBuf) -> Self {
        self.capture_dir = dir;
        self
    }

    /// Image format the program produces
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    fn render_args(&self, output: &str, request: &CaptureRequest) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", output)
                    .replace("{quality}", &request.quality.to_string())
                    .replace("{source}", &request.source.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl CameraCapture for CommandCameraCapture {
    async fn capture(&self, request: &CaptureRequest) -> Result<RawAsset> {
        tokio::fs::create_dir_all(&self.capture_dir).await?;

        let output = self
            .capture_dir
            .join(format!("capture-{}.{}", Uuid::new_v4(), self.format.extension()));
        let output_str = output.to_string_lossy().into_owned();
        let args = self.render_args(&output_str, request);

        debug!(program = %self.program, source = %request.source, quality = request.quality, "Launching capture program");

        let status = match Command::new(&self.program).args(&args).status().await {
            Ok(status) => status,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BridgeError::NotAvailable(format!(
                    "Capture program '{}' not found",
                    self.program
                )));
            }
            Err(e) => {
                return Err(BridgeError::NotAvailable(format!(
                    "Failed to launch capture program '{}': {}",
                    self.program, e
                )));
            }
        };

        if !status.success() {
            let _ = tokio::fs::remove_file(&output).await;
            info!(program = %self.program, code = ?status.code(), "Capture program exited without a photo");
            return Err(BridgeError::Cancelled(format!(
                "Capture program exited with {}",
                status
            )));
        }

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => {
                debug!(path = ?output, size = meta.len(), "Capture produced file");
                Ok(RawAsset::native(output, self.format))
            }
            Ok(_) => {
                let _ = tokio::fs::remove_file(&output).await;
                warn!(program = %self.program, "Capture program wrote an empty file");
                Err(BridgeError::Cancelled("Capture produced an empty file".to_string()))
            }
            Err(_) => Err(BridgeError::Cancelled(
                "Capture program did not produce a file".to_string(),
            )),
        }
    }

    async fn release(&self, asset: &RawAsset) -> Result<()> {
        let AssetSource::NativePath(path) = &asset.source else {
            return Ok(());
        };
        // Only files this adapter staged.
        if !path.starts_with(&self.capture_dir) {
            return Ok(());
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = ?path, "Removed staged capture");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use bridge_traits::capture::CaptureSource;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("gallery-capture-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_successful_capture_returns_native_asset() {
        let camera = CommandCameraCapture::new("sh", ["-c", "printf 0123456789 > \"$0\"", "{output}"])
            .with_capture_dir(scratch_dir());

        let asset = camera.capture(&CaptureRequest::default()).await.unwrap();
        assert_eq!(asset.format, ImageFormat::Jpeg);

        let AssetSource::NativePath(path) = asset.source else {
            panic!("expected native path");
        };
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_placeholders_are_substituted() {
        let camera = CommandCameraCapture::new(
            "sh",
            ["-c", "printf \"$1-$2\" > \"$0\"", "{output}", "{quality}", "{source}"],
        )
        .with_capture_dir(scratch_dir())
        .with_format(ImageFormat::Png);

        let request = CaptureRequest {
            quality: 80,
            source: CaptureSource::Camera,
            ..CaptureRequest::default()
        };
        let asset = camera.capture(&request).await.unwrap();

        let AssetSource::NativePath(path) = asset.source else {
            panic!("expected native path");
        };
        assert!(path.extension().is_some_and(|ext| ext == "png"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "80-camera");
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_release_removes_staged_file() {
        let dir = scratch_dir();
        let camera = CommandCameraCapture::new("sh", ["-c", "printf 0123456789 > \"$0\"", "{output}"])
            .with_capture_dir(dir.clone());

        let asset = camera.capture(&CaptureRequest::default()).await.unwrap();
        camera.release(&asset).await.unwrap();
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        // Second release of the same asset is fine.
        camera.release(&asset).await.unwrap();
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_release_ignores_files_outside_capture_dir() {
        let foreign = std::env::temp_dir().join(format!("gallery-foreign-{}.jpeg", Uuid::new_v4()));
        std::fs::write(&foreign, b"keep").unwrap();
        let camera = CommandCameraCapture::new("true", Vec::<String>::new()).with_capture_dir(scratch_dir());

        camera
            .release(&RawAsset::native(foreign.clone(), ImageFormat::Jpeg))
            .await
            .unwrap();

        assert!(foreign.exists());
        std::fs::remove_file(foreign).ok();
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_cancelled() {
        let camera = CommandCameraCapture::new("sh", ["-c", "exit 1"]).with_capture_dir(scratch_dir());

        let err = camera.capture(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_empty_output_is_cancelled() {
        let camera = CommandCameraCapture::new("sh", ["-c", ": > \"$0\"", "{output}"])
            .with_capture_dir(scratch_dir());

        let err = camera.capture(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_not_available() {
        let camera = CommandCameraCapture::new("definitely-not-a-capture-tool-3f9a", Vec::<String>::new())
            .with_capture_dir(scratch_dir());

        let err = camera.capture(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }
}
