use super::{BackendResult, DepthBackend, half_width_focal, session::LazySession, tensor};
use crate::encode::DepthConvention;
use crate::error::BackendError;
use image::RgbImage;
use ort::{session::Session, value::TensorRef};
use std::path::PathBuf;
use std::sync::Mutex;

const INPUT_NAME: &str = "pixel_values";
const DEPTH_OUTPUT: &str = "predicted_depth";
const FOCAL_OUTPUT: &str = "focal_length_px";

// Depth-Pro exports normalize input to [-1, 1]
const INPUT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const INPUT_STD: [f32; 3] = [0.5, 0.5, 0.5];

pub const DEFAULT_INPUT_SIZE: u32 = 1536;

/// Primary backend: metric monocular depth with a learned focal length,
/// from a Depth-Pro style ONNX export.
pub struct ProBackend {
    session: LazySession,
    input_size: u32,
}

impl ProBackend {
    pub fn new(model_path: PathBuf, input_size: u32) -> Self {
        Self {
            session: LazySession::new(model_path),
            input_size,
        }
    }
}

impl DepthBackend for ProBackend {
    fn name(&self) -> &'static str {
        "pro"
    }

    fn available(&self) -> bool {
        self.session.available()
    }

    fn estimate(&self, image: &RgbImage) -> Result<BackendResult, BackendError> {
        let session = self.session.get()?;
        Ok(infer(session, image, self.input_size)?)
    }
}

fn infer(
    session: &Mutex<Session>,
    image: &RgbImage,
    input_size: u32,
) -> anyhow::Result<BackendResult> {
    let (width, height) = image.dimensions();
    let input = tensor::to_nchw(image, input_size, INPUT_MEAN, INPUT_STD)?;

    let mut session = session
        .lock()
        .map_err(|_| anyhow::anyhow!("model session lock poisoned"))?;
    let outputs = session.run(ort::inputs![
        INPUT_NAME => TensorRef::from_array_view(input.view())?
    ])?;

    let depth_value = outputs
        .get(DEPTH_OUTPUT)
        .ok_or_else(|| anyhow::anyhow!("model has no `{DEPTH_OUTPUT}` output"))?;
    let native = tensor::squeeze_to_matrix(depth_value.try_extract_array::<f32>()?)?;
    let depth = tensor::resample_to(&native, width, height)?;

    // Not every export carries the focal head; mirror the half-width
    // heuristic when it is absent or degenerate.
    let focal_length_px = outputs
        .get(FOCAL_OUTPUT)
        .and_then(|v| v.try_extract_array::<f32>().ok())
        .and_then(|arr| arr.iter().next().copied())
        .filter(|f| *f > 0.0)
        .unwrap_or_else(|| half_width_focal(image));

    Ok(BackendResult {
        depth,
        // Metric depth grows with distance; encoding inverts it.
        convention: DepthConvention::DistanceIncreasing,
        focal_length_px,
    })
}
