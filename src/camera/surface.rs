//! Software drawing surface backed by the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::host::DrawingSurface;
use super::types::{CameraError, PixelBuffer, VideoFrame, JPEG_MIME};

const BYTES_PER_PIXEL: usize = 3;

/// Drawing surface that encodes RGB frames to JPEG in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegSurface;

impl JpegSurface {
    pub fn new() -> Self {
        Self
    }
}

/// Map a 0.0 - 1.0 quality onto the encoder's 1 - 100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

impl DrawingSurface for JpegSurface {
    fn draw_frame(&mut self, frame: &VideoFrame) -> Result<PixelBuffer, CameraError> {
        let resolution = frame.resolution;
        if resolution.is_empty() {
            return Err(CameraError::CaptureFailed(
                "video feed has no dimensions".to_string(),
            ));
        }

        let expected = resolution.width as usize * resolution.height as usize * BYTES_PER_PIXEL;
        if frame.data.len() != expected {
            return Err(CameraError::CaptureFailed(format!(
                "frame holds {} bytes, expected {} for {}",
                frame.data.len(),
                expected,
                resolution
            )));
        }

        Ok(PixelBuffer {
            data: frame.data.clone(),
            width: resolution.width,
            height: resolution.height,
        })
    }

    fn encode(
        &self,
        pixels: &PixelBuffer,
        mime_type: &str,
        quality: f32,
    ) -> Result<Vec<u8>, CameraError> {
        if mime_type != JPEG_MIME {
            return Err(CameraError::CaptureFailed(format!(
                "unsupported image type {}",
                mime_type
            )));
        }

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
        encoder
            .write_image(
                &pixels.data,
                pixels.width,
                pixels.height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        if buffer.is_empty() {
            return Err(CameraError::CaptureFailed(
                "encoder produced no data".to_string(),
            ));
        }
        Ok(buffer)
    }
}
