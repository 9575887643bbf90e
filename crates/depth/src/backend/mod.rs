use crate::encode::{DepthConvention, DepthMatrix};
use crate::error::BackendError;
use image::RgbImage;

pub mod luminance;

#[cfg(feature = "ort-backend")]
pub mod pro;
#[cfg(feature = "ort-backend")]
pub mod relative;

#[cfg(feature = "ort-backend")]
mod session;
#[cfg(feature = "ort-backend")]
mod tensor;

/// Raw output of one backend trial, consumed immediately by encoding.
#[derive(Debug)]
pub struct BackendResult {
    pub depth: DepthMatrix,
    pub convention: DepthConvention,
    pub focal_length_px: f32,
}

/// One depth-estimation strategy (neural model or heuristic).
///
/// Implementations guarantee the returned matrix matches the source image's
/// width and height, resampling their native model resolution if needed.
pub trait DepthBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Startup capability probe. A `true` here does not preclude a runtime
    /// failure from `estimate`.
    fn available(&self) -> bool;

    /// Run a single inference attempt on the full image.
    fn estimate(&self, image: &RgbImage) -> Result<BackendResult, BackendError>;
}

/// Focal length heuristic shared by the backends without a learned focal
/// output: half the image width. Not physically derived.
pub(crate) fn half_width_focal(image: &RgbImage) -> f32 {
    image.width() as f32 / 2.0
}
