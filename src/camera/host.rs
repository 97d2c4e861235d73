//! Host-side camera services consumed by [`CameraSession`](super::CameraSession).

use super::types::{CameraError, PixelBuffer, StreamInfo, VideoConstraints, VideoFrame};

/// Media-capture service of the host platform.
#[allow(async_fn_in_trait)]
pub trait MediaDevices {
    type Stream: MediaStream;

    /// Request a capture stream matching `constraints`.
    ///
    /// May wait indefinitely while the user answers a permission prompt.
    async fn request_video_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Self::Stream, CameraError>;
}

/// An active handle to a capture device.
pub trait MediaStream {
    /// Identity and native resolution of the stream.
    fn info(&self) -> StreamInfo;

    /// Read the frame currently shown by the live feed.
    ///
    /// Returns `None` once all tracks are stopped or before the feed has
    /// produced its first frame.
    fn current_frame(&mut self) -> Option<VideoFrame>;

    /// Number of tracks that have not been stopped yet.
    fn live_track_count(&self) -> usize;

    /// Stop every track of the stream. Stopping an already stopped
    /// track is a no-op.
    fn stop_all_tracks(&mut self);
}

/// Canvas-style surface that turns a frame into an encoded still.
pub trait DrawingSurface {
    /// Draw `frame` at its native resolution.
    fn draw_frame(&mut self, frame: &VideoFrame) -> Result<PixelBuffer, CameraError>;

    /// Encode the drawn pixels as `mime_type` at `quality` (0.0 - 1.0).
    fn encode(
        &self,
        pixels: &PixelBuffer,
        mime_type: &str,
        quality: f32,
    ) -> Result<Vec<u8>, CameraError>;
}

/// Attachment point for a live preview of the open stream.
pub trait PreviewSink {
    /// A stream was opened and frames are now flowing.
    fn attach(&mut self, stream: &StreamInfo);

    /// The stream was released.
    fn detach(&mut self);
}

/// Preview sink that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreview;

impl PreviewSink for NoPreview {
    fn attach(&mut self, _stream: &StreamInfo) {}

    fn detach(&mut self) {}
}
