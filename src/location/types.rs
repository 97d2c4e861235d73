//! Location types and data structures.

use std::time::Duration;

use serde::Serialize;

use crate::capability::CapabilityState;

/// Error message used when the host has no location capability at all.
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by this platform.";

/// Default bound on how long a fix may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default age up to which a cached fix is acceptable.
pub const DEFAULT_MAXIMUM_AGE: Duration = Duration::from_millis(60_000);

/// A resolved latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A fix reported by the host location service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

/// Options sent with every position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for the most accurate fix the host can produce
    pub high_accuracy: bool,
    /// Fail with a timeout if no fix arrives in time
    pub timeout: Duration,
    /// Accept a cached fix no older than this
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
            maximum_age: DEFAULT_MAXIMUM_AGE,
        }
    }
}

/// Errors reported by a location service.
///
/// The display text is the message shown next to the location control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The user or OS refused access to location
    #[error("{0}")]
    PermissionDenied(String),

    /// The host could not determine a position
    #[error("{0}")]
    PositionUnavailable(String),

    /// No fix arrived within the request's timeout
    #[error("Timeout expired")]
    Timeout,

    /// The host has no location capability
    #[error("Geolocation is not supported by this platform.")]
    Unsupported,
}

impl LocationError {
    /// Permission refusal with the usual host wording.
    pub fn denied() -> Self {
        LocationError::PermissionDenied("User denied Geolocation".to_string())
    }

    /// Position failure with the usual host wording.
    pub fn unavailable() -> Self {
        LocationError::PositionUnavailable("Position unavailable".to_string())
    }
}

/// Observable state of a location probe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationState {
    inner: CapabilityState<Coordinates>,
}

impl LocationState {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.inner.value
    }

    pub fn latitude(&self) -> Option<f64> {
        self.inner.value.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.inner.value.map(|c| c.longitude)
    }

    pub fn error(&self) -> Option<&str> {
        self.inner.error.as_deref()
    }

    /// True while a request is waiting on the host.
    pub fn loading(&self) -> bool {
        self.inner.pending
    }

    pub(crate) fn capability_mut(&mut self) -> &mut CapabilityState<Coordinates> {
        &mut self.inner
    }
}

/// What a single `request_location` call amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The host returned a fix
    Located(Coordinates),
    /// The request failed; the message is on the probe's state
    Failed(LocationError),
    /// Another request was already pending; no host request was issued
    AlreadyPending,
}
