//! Simulated location host.
//!
//! Answers position requests from a script of fixes and failures, after a
//! configurable delay. Like a platform location service it applies the
//! request's timeout itself and, when asked to remember fixes, reuses one
//! that is younger than the request's `maximum_age`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::host::LocationService;
use super::types::{Coordinates, LocationError, Position, PositionOptions};

const DEFAULT_ACCURACY_METERS: f64 = 12.0;

type Outcome = Result<Coordinates, LocationError>;

/// Simulated location service.
#[derive(Debug)]
pub struct SimulatedLocationService {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    delay: Duration,
    accuracy: f64,
    honour_timeout: bool,
    remember_fixes: bool,
    last_fix: Mutex<Option<(Position, Instant)>>,
    requests: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl SimulatedLocationService {
    /// Answer every request with `outcomes` in order, repeating the last one
    /// once the script runs out.
    pub fn scripted(outcomes: Vec<Outcome>) -> Self {
        let fallback = outcomes
            .last()
            .cloned()
            .unwrap_or_else(|| Err(LocationError::unavailable()));
        Self {
            script: Mutex::new(outcomes.into()),
            fallback,
            delay: Duration::ZERO,
            accuracy: DEFAULT_ACCURACY_METERS,
            honour_timeout: true,
            remember_fixes: false,
            last_fix: Mutex::new(None),
            requests: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
        }
    }

    /// Always report `coordinates`.
    pub fn fixed(coordinates: Coordinates) -> Self {
        Self::scripted(vec![Ok(coordinates)])
    }

    /// Always fail with `error`.
    pub fn failing(error: LocationError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    /// Time the host takes to produce each answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy = meters;
        self
    }

    /// Reuse the last fix while it is younger than the request's `maximum_age`.
    pub fn remembering_fixes(mut self) -> Self {
        self.remember_fixes = true;
        self
    }

    /// Never fail on the request's timeout; keep waiting for the answer.
    pub fn ignoring_timeout(mut self) -> Self {
        self.honour_timeout = false;
        self
    }

    /// Number of position requests received.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of requests answered from the remembered fix.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Outcome {
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn remembered_fix(&self, maximum_age: Duration) -> Option<Position> {
        if !self.remember_fixes || maximum_age.is_zero() {
            return None;
        }
        let last_fix = self.last_fix.lock().ok()?;
        let (position, taken_at) = (*last_fix)?;
        (taken_at.elapsed() <= maximum_age).then_some(position)
    }
}

impl LocationService for SimulatedLocationService {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(position) = self.remembered_fix(options.maximum_age) {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            return Ok(position);
        }

        let outcome = self.next_outcome();
        if self.honour_timeout && self.delay > options.timeout {
            tokio::time::sleep(options.timeout).await;
            return Err(LocationError::Timeout);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let coordinates = outcome?;
        let position = Position {
            coordinates,
            accuracy: self.accuracy,
        };
        if let Ok(mut last_fix) = self.last_fix.lock() {
            *last_fix = Some((position, Instant::now()));
        }
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_replayed_in_order() {
        let a = Coordinates::new(1.0, 1.0);
        let service = SimulatedLocationService::scripted(vec![
            Ok(a),
            Err(LocationError::denied()),
        ]);
        let options = PositionOptions::default();

        assert_eq!(service.current_position(&options).await.unwrap().coordinates, a);
        assert_eq!(
            service.current_position(&options).await,
            Err(LocationError::denied())
        );
        // Script exhausted: the last outcome repeats
        assert_eq!(
            service.current_position(&options).await,
            Err(LocationError::denied())
        );
        assert_eq!(service.requests(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_applies_timeout() {
        let service = SimulatedLocationService::fixed(Coordinates::new(1.0, 1.0))
            .with_delay(Duration::from_secs(12));
        let options = PositionOptions::default();

        let started = Instant::now();
        let result = service.current_position(&options).await;

        assert_eq!(result, Err(LocationError::Timeout));
        assert!(started.elapsed() >= options.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remembered_fix_respects_maximum_age() {
        let first = Coordinates::new(1.0, 1.0);
        let second = Coordinates::new(2.0, 2.0);
        let service =
            SimulatedLocationService::scripted(vec![Ok(first), Ok(second)]).remembering_fixes();
        let options = PositionOptions::default();

        service.current_position(&options).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let cached = service.current_position(&options).await.unwrap();
        assert_eq!(cached.coordinates, first);
        assert_eq!(service.cache_hits(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        let fresh = service.current_position(&options).await.unwrap();
        assert_eq!(fresh.coordinates, second);
        assert_eq!(service.cache_hits(), 1);
    }

    #[tokio::test]
    async fn test_zero_maximum_age_never_uses_cache() {
        let service = SimulatedLocationService::fixed(Coordinates::new(1.0, 1.0))
            .remembering_fixes();
        let options = PositionOptions {
            maximum_age: Duration::ZERO,
            ..PositionOptions::default()
        };

        service.current_position(&options).await.unwrap();
        service.current_position(&options).await.unwrap();
        assert_eq!(service.cache_hits(), 0);
    }
}
