//! Geolocation acquisition.
//!
//! [`LocationProbe`] resolves one position fix per request from a host
//! [`LocationService`]. [`SimulatedLocationService`] and [`NoGeolocation`]
//! are the bundled hosts.

mod host;
mod probe;
mod simulated;
mod types;

pub use host::{LocationService, NoGeolocation};
pub use probe::LocationProbe;
pub use simulated::SimulatedLocationService;
pub use types::{
    Coordinates, LocationError, LocationState, Position, PositionOptions, RequestOutcome,
    DEFAULT_MAXIMUM_AGE, DEFAULT_TIMEOUT, UNSUPPORTED_MESSAGE,
};
