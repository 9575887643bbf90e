use super::{BackendResult, DepthBackend, half_width_focal, session::LazySession, tensor};
use crate::encode::DepthConvention;
use crate::error::BackendError;
use image::RgbImage;
use ort::{session::Session, value::TensorRef};
use std::path::PathBuf;
use std::sync::Mutex;

const INPUT_NAME: &str = "pixel_values";
const DEPTH_OUTPUT: &str = "predicted_depth";

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub const DEFAULT_INPUT_SIZE: u32 = 384;

/// Secondary backend: relative depth from a MiDaS/DPT style ONNX export.
///
/// The model predicts disparity (larger = nearer) at its own resolution;
/// the matrix is resampled back to the source image's dimensions before
/// encoding, which downstream consumers rely on.
pub struct RelativeBackend {
    session: LazySession,
    input_size: u32,
}

impl RelativeBackend {
    pub fn new(model_path: PathBuf, input_size: u32) -> Self {
        Self {
            session: LazySession::new(model_path),
            input_size,
        }
    }
}

impl DepthBackend for RelativeBackend {
    fn name(&self) -> &'static str {
        "relative"
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
    let input = tensor::to_nchw(image, input_size, IMAGENET_MEAN, IMAGENET_STD)?;

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

    Ok(BackendResult {
        depth,
        // Disparity already grows with proximity; encoding must not invert.
        convention: DepthConvention::ProximityIncreasing,
        focal_length_px: half_width_focal(image),
    })
}
