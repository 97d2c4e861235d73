//! One-shot geolocation probe.

use tokio::sync::watch;

use super::host::LocationService;
use super::types::{LocationError, LocationState, PositionOptions, RequestOutcome};
use crate::capability::{LogNotifier, Notice, Notifier};

/// Obtains a single current position from the host location service.
///
/// State lives in a watch channel: [`state`](Self::state) returns a snapshot
/// and [`subscribe`](Self::subscribe) lets a screen follow changes. Requests
/// are serialized; calling [`request_location`](Self::request_location) while
/// one is pending issues nothing and returns [`RequestOutcome::AlreadyPending`].
pub struct LocationProbe<L: LocationService> {
    service: L,
    options: PositionOptions,
    state: watch::Sender<LocationState>,
    notifier: Box<dyn Notifier>,
}

impl<L: LocationService> std::fmt::Debug for LocationProbe<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProbe")
            .field("options", &self.options)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Clears `pending` if a request future is dropped before it resolves.
struct PendingGuard<'a> {
    state: &'a watch::Sender<LocationState>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("Location request abandoned before resolution");
            self.state.send_modify(|s| s.capability_mut().abandon());
        }
    }
}

impl<L: LocationService> LocationProbe<L> {
    pub fn new(service: L) -> Self {
        let (state, _) = watch::channel(LocationState::default());
        Self {
            service,
            options: PositionOptions::default(),
            state,
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    pub fn service(&self) -> &L {
        &self.service
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    /// Ask the host for the current position.
    ///
    /// Resolves exactly once per accepted call. On success the coordinates
    /// replace any previous ones and the error is cleared; on failure the
    /// error is set and previous coordinates are kept. A host without
    /// location support fails immediately, without a pending window.
    pub async fn request_location(&self) -> RequestOutcome {
        if !self.service.is_supported() {
            let error = LocationError::Unsupported;
            log::warn!("Location request on a host without geolocation");
            self.state
                .send_modify(|s| s.capability_mut().fail(error.to_string()));
            self.notifier.notify(Notice::inline(error.to_string()));
            return RequestOutcome::Failed(error);
        }

        if !self.state.send_if_modified(|s| s.capability_mut().begin()) {
            log::debug!("Location request already pending, ignoring");
            return RequestOutcome::AlreadyPending;
        }

        let mut guard = PendingGuard {
            state: &self.state,
            armed: true,
        };
        log::debug!("Requesting position with {:?}", self.options);

        let result = match tokio::time::timeout(
            self.options.timeout,
            self.service.current_position(&self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };
        guard.disarm();

        match result {
            Ok(position) => {
                let coordinates = position.coordinates;
                log::info!(
                    "Located at {:.6}, {:.6} (accuracy {:.0} m)",
                    coordinates.latitude,
                    coordinates.longitude,
                    position.accuracy
                );
                self.state
                    .send_modify(|s| s.capability_mut().resolve(coordinates));
                RequestOutcome::Located(coordinates)
            }
            Err(error) => {
                log::warn!("Location request failed: {}", error);
                self.state
                    .send_modify(|s| s.capability_mut().fail(error.to_string()));
                self.notifier.notify(Notice::inline(error.to_string()));
                RequestOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{NoticeBoard, NoticeKind};
    use crate::location::host::NoGeolocation;
    use crate::location::simulated::SimulatedLocationService;
    use crate::location::types::{Coordinates, UNSUPPORTED_MESSAGE};
    use std::time::Duration;

    #[tokio::test]
    async fn test_unsupported_host_fails_without_pending() {
        let board = NoticeBoard::new();
        let probe = LocationProbe::new(NoGeolocation).with_notifier(board.clone());
        let mut rx = probe.subscribe();

        let outcome = probe.request_location().await;

        assert_eq!(outcome, RequestOutcome::Failed(LocationError::Unsupported));
        let state = probe.state();
        assert_eq!(state.error(), Some(UNSUPPORTED_MESSAGE));
        assert!(!state.loading());
        assert_eq!(state.coordinates(), None);
        // Only the final state was ever published
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().loading());
        assert_eq!(board.last().map(|n| n.kind), Some(NoticeKind::Inline));
    }

    #[tokio::test]
    async fn test_success_populates_coordinates() {
        let fix = Coordinates::new(18.520430, 73.856743);
        let probe = LocationProbe::new(SimulatedLocationService::fixed(fix));

        assert_eq!(probe.request_location().await, RequestOutcome::Located(fix));

        let state = probe.state();
        assert_eq!(state.latitude(), Some(18.520430));
        assert_eq!(state.longitude(), Some(73.856743));
        assert_eq!(state.error(), None);
        assert!(!state.loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_is_visible_while_waiting() {
        let fix = Coordinates::new(1.0, 2.0);
        let service =
            SimulatedLocationService::fixed(fix).with_delay(Duration::from_secs(2));
        let probe = LocationProbe::new(service);
        let rx = probe.subscribe();

        let request = probe.request_location();
        tokio::pin!(request);
        tokio::select! {
            _ = &mut request => panic!("resolved before the host answered"),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }
        assert!(rx.borrow().loading());

        assert_eq!(request.await, RequestOutcome::Located(fix));
        assert!(!rx.borrow().loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_while_pending_is_coalesced() {
        let fix = Coordinates::new(1.0, 2.0);
        let service =
            SimulatedLocationService::fixed(fix).with_delay(Duration::from_secs(2));
        let probe = LocationProbe::new(service);

        let (first, second) = tokio::join!(probe.request_location(), probe.request_location());

        assert_eq!(first, RequestOutcome::Located(fix));
        assert_eq!(second, RequestOutcome::AlreadyPending);
        assert_eq!(probe.service().requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_clears_pending() {
        let service = SimulatedLocationService::fixed(Coordinates::new(1.0, 2.0))
            .with_delay(Duration::from_secs(5));
        let probe = LocationProbe::new(service);

        let _ = tokio::time::timeout(Duration::from_secs(1), probe.request_location()).await;

        let state = probe.state();
        assert!(!state.loading());
        assert_eq!(state.coordinates(), None);
        assert_eq!(state.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_enforces_timeout_on_slow_host() {
        // Host that ignores the timeout option entirely
        let service = SimulatedLocationService::fixed(Coordinates::new(1.0, 2.0))
            .with_delay(Duration::from_secs(30))
            .ignoring_timeout();
        let probe = LocationProbe::new(service);

        let outcome = probe.request_location().await;

        assert_eq!(outcome, RequestOutcome::Failed(LocationError::Timeout));
        assert!(!probe.state().loading());
    }
}
