//! Simulated media-capture host.
//!
//! Stands in for a platform camera stack: a fixed device list, a scripted
//! answer to the permission prompt, and a synthetic live feed. Every track
//! handed out is counted in a [`TrackLedger`] so callers can check that what
//! was opened was also stopped.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::host::{MediaDevices, MediaStream};
use super::types::{
    CameraError, DeviceInfo, FacingMode, Resolution, StreamInfo, VideoConstraints, VideoFrame,
};

/// Counts of tracks opened and stopped by a simulated host.
#[derive(Debug, Clone, Default)]
pub struct TrackLedger {
    opened: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl TrackLedger {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Tracks opened but not yet stopped.
    pub fn live(&self) -> usize {
        self.opened().saturating_sub(self.stopped())
    }
}

/// How the simulated user answers the permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAnswer {
    Grant,
    Deny,
}

/// Simulated media-capture service.
#[derive(Debug)]
pub struct SimulatedMediaDevices {
    devices: Vec<DeviceInfo>,
    permission: PermissionAnswer,
    prompt_delay: Duration,
    feed_resolution: Arc<Mutex<Resolution>>,
    ledger: TrackLedger,
    next_stream: AtomicU64,
}

impl SimulatedMediaDevices {
    /// Host exposing `devices`, granting access immediately.
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            permission: PermissionAnswer::Grant,
            prompt_delay: Duration::ZERO,
            feed_resolution: Arc::new(Mutex::new(Resolution::default())),
            ledger: TrackLedger::default(),
            next_stream: AtomicU64::new(1),
        }
    }

    /// A phone with a single rear camera.
    pub fn rear_camera() -> Self {
        Self::new(vec![DeviceInfo {
            id: "camera-rear".to_string(),
            label: "Back Camera".to_string(),
            facing: Some(FacingMode::Environment),
        }])
    }

    /// A phone with a front and a rear camera, front listed first.
    pub fn front_and_rear() -> Self {
        Self::new(vec![
            DeviceInfo {
                id: "camera-front".to_string(),
                label: "Front Camera".to_string(),
                facing: Some(FacingMode::User),
            },
            DeviceInfo {
                id: "camera-rear".to_string(),
                label: "Back Camera".to_string(),
                facing: Some(FacingMode::Environment),
            },
        ])
    }

    /// A host without any capture device.
    pub fn no_devices() -> Self {
        Self::new(Vec::new())
    }

    /// A rear camera whose permission prompt is refused.
    pub fn denied() -> Self {
        Self::rear_camera().with_permission(PermissionAnswer::Deny)
    }

    pub fn with_permission(mut self, permission: PermissionAnswer) -> Self {
        self.permission = permission;
        self
    }

    /// Time the simulated user takes to answer the permission prompt.
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    pub fn with_resolution(self, resolution: Resolution) -> Self {
        self.set_feed_resolution(resolution);
        self
    }

    /// Change the native resolution of every live feed, as a device
    /// rotation would.
    pub fn set_feed_resolution(&self, resolution: Resolution) {
        if let Ok(mut current) = self.feed_resolution.lock() {
            *current = resolution;
        }
    }

    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    pub fn ledger(&self) -> TrackLedger {
        self.ledger.clone()
    }

    /// Pick the device facing the requested way, falling back to the first.
    pub fn select_device(&self, facing: FacingMode) -> Option<&DeviceInfo> {
        self.devices
            .iter()
            .find(|d| d.facing == Some(facing))
            .or_else(|| self.devices.first())
    }
}

impl MediaDevices for SimulatedMediaDevices {
    type Stream = SimulatedStream;

    async fn request_video_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, CameraError> {
        let device = self
            .select_device(constraints.facing_mode)
            .ok_or(CameraError::DeviceUnavailable)?;

        if !self.prompt_delay.is_zero() {
            tokio::time::sleep(self.prompt_delay).await;
        }
        if self.permission == PermissionAnswer::Deny {
            return Err(CameraError::PermissionDenied);
        }

        let track_count = if constraints.audio { 2 } else { 1 };
        self.ledger.opened.fetch_add(track_count, Ordering::SeqCst);
        let id = self.next_stream.fetch_add(1, Ordering::SeqCst);

        Ok(SimulatedStream {
            id: format!("stream-{}", id),
            device_label: device.label.clone(),
            feed_resolution: Arc::clone(&self.feed_resolution),
            tracks_stopped: vec![false; track_count],
            frame_index: 0,
            ledger: self.ledger.clone(),
        })
    }
}

/// A live stream handed out by [`SimulatedMediaDevices`].
#[derive(Debug)]
pub struct SimulatedStream {
    id: String,
    device_label: String,
    feed_resolution: Arc<Mutex<Resolution>>,
    tracks_stopped: Vec<bool>,
    frame_index: u64,
    ledger: TrackLedger,
}

impl SimulatedStream {
    fn resolution(&self) -> Resolution {
        self.feed_resolution
            .lock()
            .map(|r| *r)
            .unwrap_or_default()
    }

    /// Number of frames read from the feed so far.
    pub fn frames_read(&self) -> u64 {
        self.frame_index
    }
}

impl MediaStream for SimulatedStream {
    fn info(&self) -> StreamInfo {
        StreamInfo {
            id: self.id.clone(),
            device_label: self.device_label.clone(),
            resolution: self.resolution(),
        }
    }

    fn current_frame(&mut self) -> Option<VideoFrame> {
        if self.live_track_count() == 0 {
            return None;
        }

        self.frame_index += 1;
        let resolution = self.resolution();
        let shift = (self.frame_index % 256) as u8;
        let pixel_count = resolution.width as usize * resolution.height as usize;
        let mut data = Vec::with_capacity(pixel_count * 3);
        for y in 0..resolution.height {
            for x in 0..resolution.width {
                data.push((x % 256) as u8 ^ shift);
                data.push((y % 256) as u8);
                data.push(shift);
            }
        }

        Some(VideoFrame {
            data,
            resolution,
            timestamp: Instant::now(),
        })
    }

    fn live_track_count(&self) -> usize {
        self.tracks_stopped.iter().filter(|stopped| !**stopped).count()
    }

    fn stop_all_tracks(&mut self) {
        let mut newly_stopped = 0;
        for stopped in self.tracks_stopped.iter_mut().filter(|s| !**s) {
            *stopped = true;
            newly_stopped += 1;
        }
        self.ledger.stopped.fetch_add(newly_stopped, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_device_prefers_requested_facing() {
        let host = SimulatedMediaDevices::front_and_rear();
        let device = host.select_device(FacingMode::Environment).unwrap();
        assert_eq!(device.id, "camera-rear");
    }

    #[test]
    fn test_select_device_falls_back_to_first() {
        let host = SimulatedMediaDevices::rear_camera();
        let device = host.select_device(FacingMode::User).unwrap();
        assert_eq!(device.id, "camera-rear");
        assert!(SimulatedMediaDevices::no_devices()
            .select_device(FacingMode::User)
            .is_none());
    }

    #[tokio::test]
    async fn test_request_without_devices_is_unavailable() {
        let host = SimulatedMediaDevices::no_devices();
        let result = host.request_video_stream(&VideoConstraints::default()).await;
        assert!(matches!(result, Err(CameraError::DeviceUnavailable)));
        assert_eq!(host.ledger().opened(), 0);
    }

    #[tokio::test]
    async fn test_stop_all_tracks_counts_each_track_once() {
        let host = SimulatedMediaDevices::rear_camera();
        let ledger = host.ledger();
        let constraints = VideoConstraints {
            audio: true,
            ..VideoConstraints::default()
        };
        let mut stream = host.request_video_stream(&constraints).await.unwrap();
        assert_eq!(stream.live_track_count(), 2);

        stream.stop_all_tracks();
        stream.stop_all_tracks();

        assert_eq!(ledger.opened(), 2);
        assert_eq!(ledger.stopped(), 2);
        assert!(stream.current_frame().is_none());
    }

    #[tokio::test]
    async fn test_frames_follow_feed_resolution() {
        let host = SimulatedMediaDevices::rear_camera();
        let mut stream = host
            .request_video_stream(&VideoConstraints::default())
            .await
            .unwrap();

        let first = stream.current_frame().unwrap();
        assert_eq!(first.resolution, Resolution::VGA);

        host.set_feed_resolution(Resolution::HD);
        let second = stream.current_frame().unwrap();
        assert_eq!(second.resolution, Resolution::HD);
        assert_eq!(second.data.len(), 1280 * 720 * 3);
        assert_eq!(stream.frames_read(), 2);
    }
}
