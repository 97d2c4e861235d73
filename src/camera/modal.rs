//! The "Take Photo" dialog flow.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::capture::CameraSession;
use super::host::{DrawingSurface, MediaDevices};
use super::types::{CameraError, EncodedImage};

/// A photo file handed to the form that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub mime_type: String,
    /// Size of the encoded file in bytes
    pub size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl PhotoAttachment {
    /// Wrap a captured still as `photo-<unix millis>.jpg`.
    pub fn from_capture(image: EncodedImage, taken_at: SystemTime) -> Self {
        let millis = taken_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            file_name: format!("photo-{}.jpg", millis),
            mime_type: image.mime_type,
            size: image.bytes.len(),
            bytes: image.bytes,
        }
    }

    /// A file picked from the gallery instead of the camera.
    pub fn from_file(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size: bytes.len(),
            bytes,
        }
    }
}

/// Dialog that owns a camera session for the duration of one photo.
///
/// Every way out of the dialog (a successful capture, dismissal, or the
/// dialog being dropped) releases the camera.
#[derive(Debug)]
pub struct CameraModal<D: MediaDevices, S: DrawingSurface> {
    session: CameraSession<D, S>,
    visible: bool,
}

impl<D: MediaDevices, S: DrawingSurface> CameraModal<D, S> {
    pub fn new(session: CameraSession<D, S>) -> Self {
        Self {
            session,
            visible: false,
        }
    }

    pub fn session(&self) -> &CameraSession<D, S> {
        &self.session
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the dialog. The camera stays closed until [`start_camera`](Self::start_camera).
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// "Start Camera": open the session and start the preview.
    ///
    /// Failures have already been alerted by the session when this returns.
    pub async fn start_camera(&mut self) -> Result<(), CameraError> {
        self.show();
        self.session.open().await
    }

    /// "Capture Photo": take the current frame, then close the camera and
    /// hide the dialog.
    ///
    /// On failure the dialog stays up with the camera as it was, so the user
    /// can try again.
    pub fn capture(&mut self) -> Result<PhotoAttachment, CameraError> {
        let image = self.session.capture_photo()?;
        let photo = PhotoAttachment::from_capture(image, SystemTime::now());
        log::info!("Captured {} ({} bytes)", photo.file_name, photo.size);
        self.dismiss();
        Ok(photo)
    }

    /// Close the camera and hide the dialog.
    pub fn dismiss(&mut self) {
        self.session.close();
        self.visible = false;
    }
}
