//! Host-side location services consumed by [`LocationProbe`](super::LocationProbe).

use super::types::{LocationError, Position, PositionOptions};

/// Location service of the host platform.
#[allow(async_fn_in_trait)]
pub trait LocationService {
    /// Whether the host offers a location capability at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Resolve one position fix honouring `options`.
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError>;
}

/// A host without any location capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

impl LocationService for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Position, LocationError> {
        Err(LocationError::Unsupported)
    }
}
