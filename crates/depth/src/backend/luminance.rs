use super::{BackendResult, DepthBackend, half_width_focal};
use crate::encode::{DepthConvention, DepthMatrix};
use crate::error::BackendError;
use image::RgbImage;

pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;

/// Tertiary backend: pseudo-depth from smoothed brightness.
///
/// No model dependency, so it can never be unavailable. The blur removes
/// fine texture while keeping the large gradients that read as depth; the
/// result is a crude proxy, enough for a parallax effect.
pub struct LuminanceBackend {
    blur_radius: f32,
}

impl LuminanceBackend {
    pub fn new(blur_radius: f32) -> Self {
        Self { blur_radius }
    }
}

impl Default for LuminanceBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_RADIUS)
    }
}

impl DepthBackend for LuminanceBackend {
    fn name(&self) -> &'static str {
        "luminance"
    }

    fn available(&self) -> bool {
        true
    }

    fn estimate(&self, image: &RgbImage) -> Result<BackendResult, BackendError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::Execution(anyhow::anyhow!(
                "zero-area image ({}x{})",
                width,
                height
            )));
        }

        let gray = image::imageops::grayscale(image);
        let blurred = image::imageops::blur(&gray, self.blur_radius);

        let depth = DepthMatrix::from_shape_fn((height as usize, width as usize), |(y, x)| {
            blurred.get_pixel(x as u32, y as u32)[0] as f32
        });

        Ok(BackendResult {
            depth,
            // Bright reads as near; no inversion during encoding.
            convention: DepthConvention::ProximityIncreasing,
            focal_length_px: half_width_focal(image),
        })
    }
}
