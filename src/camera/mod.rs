//! Camera session module for taking a single still photo.
//!
//! This module provides a high-level API for camera capture operations:
//! - Session lifecycle via [`CameraSession`] (open, capture, close)
//! - The "Take Photo" dialog flow via [`CameraModal`]
//! - Host services via the [`MediaDevices`], [`MediaStream`] and
//!   [`DrawingSurface`] traits, with [`SimulatedMediaDevices`] and
//!   [`JpegSurface`] as the bundled implementations

mod capture;
mod host;
mod modal;
mod simulated;
mod surface;
mod types;

pub use capture::CameraSession;
pub use host::{DrawingSurface, MediaDevices, MediaStream, NoPreview, PreviewSink};
pub use modal::{CameraModal, PhotoAttachment};
pub use simulated::{PermissionAnswer, SimulatedMediaDevices, SimulatedStream, TrackLedger};
pub use surface::{jpeg_quality, JpegSurface};
pub use types::{
    CameraError, DeviceInfo, EncodedImage, FacingMode, PixelBuffer, Resolution, StreamInfo,
    VideoConstraints, VideoFrame, CAMERA_ACCESS_MESSAGE, CAPTURE_FAILED_MESSAGE,
    DEFAULT_JPEG_QUALITY, JPEG_MIME,
};
