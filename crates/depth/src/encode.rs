use image::{GrayImage, Luma};
use ndarray::Array2;

/// Raw, backend-specific floating point depth values. Units and scale are
/// not comparable across backends.
pub type DepthMatrix = Array2<f32>;

/// Direction of a backend's raw depth scale.
///
/// Encoding guarantees brighter = nearer regardless of which convention the
/// producing backend uses, so each backend declares its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthConvention {
    /// Values grow with distance (metric depth). Inverted during encoding.
    DistanceIncreasing,
    /// Values grow with proximity (disparity, luminance proxy). Encoded as-is.
    ProximityIncreasing,
}

/// Keeps the degenerate all-equal matrix finite instead of dividing by zero.
const NORM_EPSILON: f32 = 1e-8;

/// Map a raw depth matrix to the canonical 8-bit grayscale contract:
/// 0 = farthest, 255 = nearest, dimensions equal to the matrix.
///
/// Pure and backend-agnostic; this is what lets the orchestrator present one
/// output contract over heterogeneous backends.
pub fn encode(matrix: &DepthMatrix, convention: DepthConvention) -> anyhow::Result<GrayImage> {
    let (height, width) = matrix.dim();
    if width == 0 || height == 0 {
        anyhow::bail!("cannot encode an empty depth matrix");
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in matrix.iter() {
        if !v.is_finite() {
            anyhow::bail!("depth matrix contains non-finite values");
        }
        min = min.min(v);
        max = max.max(v);
    }

    let range = max - min + NORM_EPSILON;
    let mut out = GrayImage::new(width as u32, height as u32);
    for ((y, x), &v) in matrix.indexed_iter() {
        let mut normalized = (v - min) / range;
        if convention == DepthConvention::DistanceIncreasing {
            normalized = 1.0 - normalized;
        }
        let quantized = (normalized * 255.0).round().clamp(0.0, 255.0) as u8;
        out.put_pixel(x as u32, y as u32, Luma([quantized]));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn output_matches_matrix_dimensions() {
        let matrix = DepthMatrix::zeros((7, 11));
        let image = encode(&matrix, DepthConvention::DistanceIncreasing).unwrap();
        assert_eq!(image.dimensions(), (11, 7));
    }

    #[test]
    fn distance_increasing_renders_nearest_brightest() {
        // Metric depth: 1.0 is nearest, 9.0 farthest.
        let matrix = array![[1.0f32, 5.0], [9.0, 5.0]];
        let image = encode(&matrix, DepthConvention::DistanceIncreasing).unwrap();
        assert_eq!(image.get_pixel(0, 0)[0], 255);
        assert_eq!(image.get_pixel(0, 1)[0], 0);
    }

    #[test]
    fn proximity_increasing_renders_max_brightest() {
        // Disparity: larger values are nearer, no inversion.
        let matrix = array![[0.0f32, 10.0]];
        let image = encode(&matrix, DepthConvention::ProximityIncreasing).unwrap();
        assert_eq!(image.get_pixel(0, 0)[0], 0);
        assert_eq!(image.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn uniform_matrix_encodes_without_division_error() {
        let matrix = DepthMatrix::from_elem((5, 5), 3.25);
        let image = encode(&matrix, DepthConvention::DistanceIncreasing).unwrap();
        let first = image.get_pixel(0, 0)[0];
        assert!(image.pixels().all(|p| p[0] == first), "image must be uniform");
    }

    #[test]
    fn encoding_is_idempotent() {
        let matrix = array![[0.1f32, 0.7, 0.3], [0.9, 0.2, 0.5]];
        let a = encode(&matrix, DepthConvention::DistanceIncreasing).unwrap();
        let b = encode(&matrix, DepthConvention::DistanceIncreasing).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn rejects_non_finite_values() {
        let matrix = array![[1.0f32, f32::NAN]];
        assert!(encode(&matrix, DepthConvention::DistanceIncreasing).is_err());
    }

    #[test]
    fn rejects_empty_matrix() {
        let matrix = DepthMatrix::zeros((0, 0));
        assert!(encode(&matrix, DepthConvention::DistanceIncreasing).is_err());
    }
}
