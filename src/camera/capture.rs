//! Camera session handle and public API.

use std::fmt;

use super::host::{DrawingSurface, MediaDevices, MediaStream, NoPreview, PreviewSink};
use super::types::{
    CameraError, EncodedImage, StreamInfo, VideoConstraints, DEFAULT_JPEG_QUALITY, JPEG_MIME,
};
use crate::capability::{LogNotifier, Notice, Notifier};

/// Camera session handle.
///
/// Owns the capture stream exclusively between a successful [`open`] and the
/// matching [`close`]. The stream is also released when the session is
/// dropped, so every exit path of the owning screen gives the device back.
///
/// Failures are returned to the caller, recorded as [`last_error`], and
/// announced as an alert through the session's [`Notifier`].
///
/// [`open`]: CameraSession::open
/// [`close`]: CameraSession::close
/// [`last_error`]: CameraSession::last_error
pub struct CameraSession<D: MediaDevices, S: DrawingSurface> {
    /// Host media-capture service
    devices: D,
    /// Canvas used to turn frames into stills
    surface: S,
    /// Constraints sent with every stream request
    constraints: VideoConstraints,
    /// Encoder quality (0.0 - 1.0)
    quality: f32,
    /// Stream held while open
    stream: Option<D::Stream>,
    /// Live preview attachment point
    preview: Box<dyn PreviewSink>,
    /// Where user-facing failures go
    notifier: Box<dyn Notifier>,
    /// Message of the last failure
    last_error: Option<String>,
}

impl<D: MediaDevices, S: DrawingSurface> fmt::Debug for CameraSession<D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSession")
            .field("constraints", &self.constraints)
            .field("quality", &self.quality)
            .field("is_open", &self.is_open())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<D: MediaDevices, S: DrawingSurface> CameraSession<D, S> {
    /// Create an idle session. No device is touched until [`open`](Self::open).
    pub fn new(devices: D, surface: S) -> Self {
        Self {
            devices,
            surface,
            constraints: VideoConstraints::default(),
            quality: DEFAULT_JPEG_QUALITY,
            stream: None,
            preview: Box::new(NoPreview),
            notifier: Box::new(LogNotifier),
            last_error: None,
        }
    }

    pub fn with_constraints(mut self, constraints: VideoConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_preview(mut self, preview: impl PreviewSink + 'static) -> Self {
        self.preview = Box::new(preview);
        self
    }

    pub fn constraints(&self) -> &VideoConstraints {
        &self.constraints
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// The host media-capture service backing this session.
    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// True between a successful open and close.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// The stream currently feeding the preview, if open.
    pub fn preview(&self) -> Option<StreamInfo> {
        self.stream.as_ref().map(MediaStream::info)
    }

    /// Number of live tracks held by this session.
    pub fn live_track_count(&self) -> usize {
        self.stream
            .as_ref()
            .map_or(0, MediaStream::live_track_count)
    }

    /// User-facing message of the last failure, cleared by a successful open.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Request a capture stream and start the live preview.
    ///
    /// Opening an already open session releases the current stream and
    /// requests a new one. There is no timeout: the request waits for as long
    /// as the host permission prompt stays unanswered.
    ///
    /// # Errors
    /// * `CameraError::DeviceUnavailable` - No device matched the request
    /// * `CameraError::PermissionDenied` - The host refused access
    pub async fn open(&mut self) -> Result<(), CameraError> {
        self.close();

        match self.devices.request_video_stream(&self.constraints).await {
            Ok(stream) => {
                let info = stream.info();
                log::info!(
                    "Camera stream {} opened on {} at {}",
                    info.id,
                    info.device_label,
                    info.resolution
                );
                self.preview.attach(&info);
                self.stream = Some(stream);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Error accessing camera: {}", e);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Capture the frame currently shown by the live feed as a JPEG still.
    ///
    /// The still has the feed's native resolution at the moment of capture.
    /// The session stays open.
    ///
    /// # Errors
    /// * `CameraError::NotOpen` - No stream is open
    /// * `CameraError::CaptureFailed` - The frame could not be drawn or encoded
    pub fn capture_photo(&mut self) -> Result<EncodedImage, CameraError> {
        let result = self.encode_current_frame();
        match &result {
            Ok(image) => log::debug!(
                "Captured {}x{} still ({} bytes)",
                image.width,
                image.height,
                image.len()
            ),
            Err(e) => {
                log::error!("Error capturing photo: {}", e);
                self.report(e);
            }
        }
        result
    }

    fn encode_current_frame(&mut self) -> Result<EncodedImage, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotOpen)?;
        let frame = stream.current_frame().ok_or_else(|| {
            CameraError::CaptureFailed("live feed has no frame yet".to_string())
        })?;

        let pixels = self.surface.draw_frame(&frame)?;
        let bytes = self.surface.encode(&pixels, JPEG_MIME, self.quality)?;
        if bytes.is_empty() {
            return Err(CameraError::CaptureFailed(
                "encoder produced no data".to_string(),
            ));
        }

        Ok(EncodedImage {
            bytes,
            mime_type: JPEG_MIME.to_string(),
            width: pixels.width,
            height: pixels.height,
        })
    }

    /// Stop every track and release the device.
    ///
    /// Closing a session that is not open does nothing.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            self.preview.detach();
            log::info!("Camera stream {} released", stream.info().id);
        }
    }

    fn report(&mut self, error: &CameraError) {
        let message = error.user_message();
        self.last_error = Some(message.to_string());
        self.notifier.notify(Notice::alert(message));
    }
}

impl<D: MediaDevices, S: DrawingSurface> Drop for CameraSession<D, S> {
    fn drop(&mut self) {
        self.close();
    }
}
