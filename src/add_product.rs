//! The add-product screen.
//!
//! Owns one camera dialog and one location probe for its lifetime. Photos go
//! into the [`ProductDraft`] as they are taken; the probe's coordinates are
//! copied in when the product is submitted. Dropping the screen releases the
//! camera.

use std::time::SystemTime;

use crate::camera::{
    CameraError, CameraModal, CameraSession, DrawingSurface, MediaDevices, PhotoAttachment,
};
use crate::capability::{Notice, NoticeBoard, Notifier};
use crate::location::{LocationProbe, LocationService, LocationState, RequestOutcome};
use crate::product::{product_id, Field, ProductDraft, ProductError, RegisteredProduct};

pub const USE_LOCATION_LABEL: &str = "Use Current Location";
pub const LOCATING_LABEL: &str = "Getting Location...";

pub struct AddProductScreen<D: MediaDevices, S: DrawingSurface, L: LocationService> {
    draft: ProductDraft,
    camera: CameraModal<D, S>,
    location: LocationProbe<L>,
    notices: NoticeBoard,
}

impl<D: MediaDevices, S: DrawingSurface, L: LocationService> AddProductScreen<D, S, L> {
    /// Build the screen around a session and a probe. Both report their
    /// failures to the screen's notice board.
    pub fn new(session: CameraSession<D, S>, probe: LocationProbe<L>) -> Self {
        let notices = NoticeBoard::new();
        Self {
            draft: ProductDraft::default(),
            camera: CameraModal::new(session.with_notifier(notices.clone())),
            location: probe.with_notifier(notices.clone()),
            notices,
        }
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn camera(&self) -> &CameraModal<D, S> {
        &self.camera
    }

    pub fn location(&self) -> &LocationProbe<L> {
        &self.location
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// "Take Photo": show the camera dialog.
    pub fn open_camera_dialog(&mut self) {
        self.camera.show();
    }

    /// "Start Camera" inside the dialog.
    pub async fn start_camera(&mut self) -> Result<(), CameraError> {
        self.camera.start_camera().await
    }

    /// "Capture Photo" inside the dialog. The photo replaces any previous one.
    pub fn capture_photo(&mut self) -> Result<(), CameraError> {
        let photo = self.camera.capture()?;
        self.draft.photo = Some(photo);
        Ok(())
    }

    /// Close button of the dialog.
    pub fn cancel_camera(&mut self) {
        self.camera.dismiss();
    }

    /// Whole camera flow in one step: show, start, capture.
    ///
    /// On any failure the camera is released and the dialog dismissed.
    pub async fn take_photo(&mut self) -> Result<(), CameraError> {
        self.open_camera_dialog();
        if let Err(e) = self.start_camera().await {
            self.cancel_camera();
            return Err(e);
        }
        match self.capture_photo() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.cancel_camera();
                Err(e)
            }
        }
    }

    /// "Upload from Gallery".
    pub fn attach_photo_file(&mut self, photo: PhotoAttachment) {
        log::info!("Attached {} ({} bytes)", photo.file_name, photo.size);
        self.draft.photo = Some(photo);
    }

    /// "Change": drop the current photo.
    pub fn clear_photo(&mut self) {
        self.draft.photo = None;
    }

    /// "Use Current Location".
    ///
    /// Takes `&self` so labels can be read while the request is pending. A
    /// failed request keeps whatever location was acquired before.
    pub async fn use_current_location(&self) -> RequestOutcome {
        self.location.request_location().await
    }

    pub fn location_state(&self) -> LocationState {
        self.location.state()
    }

    /// Text shown under "Farm Location" once a fix is known.
    pub fn location_label(&self) -> Option<String> {
        self.location
            .state()
            .coordinates()
            .map(|c| format!("GPS: {:.6}, {:.6}", c.latitude, c.longitude))
    }

    /// Inline error shown next to the location button.
    pub fn location_error(&self) -> Option<String> {
        self.location.state().error().map(str::to_string)
    }

    pub fn location_button_label(&self) -> &'static str {
        if self.location.state().loading() {
            LOCATING_LABEL
        } else {
            USE_LOCATION_LABEL
        }
    }

    pub fn can_submit(&self) -> bool {
        self.draft.can_submit()
    }

    /// "Register Product". The product is logged, never stored.
    pub fn submit(&self) -> Result<RegisteredProduct, ProductError> {
        self.submit_at(SystemTime::now())
    }

    pub fn submit_at(&self, registered_at: SystemTime) -> Result<RegisteredProduct, ProductError> {
        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            return Err(ProductError::MissingFields(
                missing.iter().map(Field::label).collect(),
            ));
        }

        let mut draft = self.draft.clone();
        draft.location = self.location.state().coordinates();
        let product = RegisteredProduct {
            id: product_id(&draft.crop_name, registered_at),
            draft,
        };
        let payload =
            serde_json::to_string(&product).map_err(|e| ProductError::Encode(e.to_string()))?;
        log::info!("Product registered: {}", payload);

        self.notices.notify(Notice::alert(format!(
            "Product registered successfully! ID: {}",
            product.id
        )));
        Ok(product)
    }
}
