//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use serde::Deserialize;

/// MIME type of every still produced by a camera session.
pub const JPEG_MIME: &str = "image/jpeg";

/// Encoder quality used for captured stills (0.0 - 1.0).
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

/// User-facing alert raised when the camera cannot be opened.
pub const CAMERA_ACCESS_MESSAGE: &str = "Unable to access camera. Please check permissions.";

/// User-facing alert raised when a still cannot be produced.
pub const CAPTURE_FAILED_MESSAGE: &str = "Unable to capture photo. Please try again.";

/// Which way a capture device points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera (selfie)
    User,
    /// Rear camera
    Environment,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Information about a capture device exposed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Host device identifier
    pub id: String,
    /// Human-readable device label
    pub label: String,
    /// Direction the device faces, if the host reports it
    pub facing: Option<FacingMode>,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.facing {
            Some(facing) => write!(f, "[{}] {} ({})", self.id, self.label, facing),
            None => write!(f, "[{}] {}", self.id, self.label),
        }
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Constraints passed to the host when requesting a capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    /// Preferred device direction
    pub facing_mode: FacingMode,
    /// Whether an audio track is requested alongside video
    pub audio: bool,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            audio: false,
        }
    }
}

/// A single frame read from the live feed.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Raw pixel data, RGB, 3 bytes per pixel
    pub data: Vec<u8>,
    /// Native resolution of the feed at the time the frame was read
    pub resolution: Resolution,
    /// When the frame was read
    pub timestamp: Instant,
}

/// Pixels drawn from a frame onto a drawing surface.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// RGB pixel data, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A still photo: encoded bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Summary of an open stream, handed to preview sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Host stream identifier
    pub id: String,
    /// Label of the device backing the stream
    pub device_label: String,
    /// Native resolution of the feed
    pub resolution: Resolution,
}

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    /// The user or OS refused access to the camera
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No capture device matched the request
    #[error("No camera device available")]
    DeviceUnavailable,

    /// Capture was attempted without a live stream
    #[error("Camera is not open")]
    NotOpen,

    /// The frame could not be drawn or encoded
    #[error("Failed to capture photo: {0}")]
    CaptureFailed(String),
}

impl CameraError {
    /// Message shown to the user when this error surfaces.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied | CameraError::DeviceUnavailable => {
                CAMERA_ACCESS_MESSAGE
            }
            CameraError::NotOpen | CameraError::CaptureFailed(_) => CAPTURE_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_display() {
        let info = DeviceInfo {
            id: "cam-0".to_string(),
            label: "Back Camera".to_string(),
            facing: Some(FacingMode::Environment),
        };
        assert_eq!(format!("{}", info), "[cam-0] Back Camera (environment)");

        let unknown = DeviceInfo {
            facing: None,
            ..info
        };
        assert_eq!(format!("{}", unknown), "[cam-0] Back Camera");
    }

    #[test]
    fn test_constraints_default_to_rear_video_only() {
        let constraints = VideoConstraints::default();
        assert_eq!(constraints.facing_mode, FacingMode::Environment);
        assert!(!constraints.audio);
    }

    #[test]
    fn test_resolution_display_and_empty() {
        assert_eq!(Resolution::HD.to_string(), "1280x720");
        assert!(!Resolution::default().is_empty());
        assert!(Resolution {
            width: 0,
            height: 480
        }
        .is_empty());
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(
            CameraError::PermissionDenied.to_string(),
            "Camera permission denied"
        );
        assert_eq!(
            CameraError::CaptureFailed("empty".to_string()).to_string(),
            "Failed to capture photo: empty"
        );
    }

    #[test]
    fn test_camera_error_user_message() {
        assert_eq!(
            CameraError::DeviceUnavailable.user_message(),
            CAMERA_ACCESS_MESSAGE
        );
        assert_eq!(CameraError::NotOpen.user_message(), CAPTURE_FAILED_MESSAGE);
    }

    #[test]
    fn test_facing_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            facing: FacingMode,
        }
        let parsed: Wrapper = toml::from_str("facing = \"user\"").unwrap();
        assert_eq!(parsed.facing, FacingMode::User);
    }
}
