use crate::error::DepthError;
use image::RgbImage;

/// Decode raw upload bytes into an RGB raster.
///
/// Alpha channels and color profiles are dropped. Undecodable or truncated
/// input fails with [`DepthError::Decode`]; the caller must resupply valid
/// bytes, there is no retry.
pub fn load(raw: &[u8]) -> Result<RgbImage, DepthError> {
    let decoded = image::load_from_memory(raw).map_err(DepthError::Decode)?;
    Ok(decoded.to_rgb8())
}
