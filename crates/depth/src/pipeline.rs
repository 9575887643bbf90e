use crate::backend::DepthBackend;
use crate::backend::luminance::{DEFAULT_BLUR_RADIUS, LuminanceBackend};
#[cfg(feature = "ort-backend")]
use crate::backend::{pro::ProBackend, relative::RelativeBackend};
use crate::encode;
use crate::error::{BackendAttempt, BackendError, DepthError};
use crate::loader;
use image::GrayImage;
use std::path::PathBuf;
use std::sync::Arc;

/// The encoded result of one pipeline run: the canonical depth image plus
/// the focal length estimate and the backend that produced them.
#[derive(Debug)]
pub struct Depth {
    pub image: GrayImage,
    pub focal_length_px: f32,
    pub backend: &'static str,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub pro_model_path: PathBuf,
    pub pro_input_size: u32,
    pub relative_model_path: PathBuf,
    pub relative_input_size: u32,
    pub blur_radius: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pro_model_path: PathBuf::from("models/depth_pro.onnx"),
            pro_input_size: 1536,
            relative_model_path: PathBuf::from("models/dpt_hybrid.onnx"),
            relative_input_size: 384,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

/// Tries backends in fixed priority order and absorbs their failures;
/// only decode failure or full exhaustion surfaces to the caller.
pub struct DepthPipeline {
    backends: Vec<Arc<dyn DepthBackend>>,
}

impl DepthPipeline {
    /// Build from an explicit backend list in priority order. Used by the
    /// default constructor and by tests with mock backends.
    pub fn new(backends: Vec<Arc<dyn DepthBackend>>) -> Self {
        Self { backends }
    }

    /// Resolve the backend registry once at startup: probe each candidate's
    /// availability and keep the usable ones in priority order.
    pub fn with_default_backends(config: &PipelineConfig) -> Self {
        let mut candidates: Vec<Arc<dyn DepthBackend>> = Vec::new();

        #[cfg(feature = "ort-backend")]
        {
            candidates.push(Arc::new(ProBackend::new(
                config.pro_model_path.clone(),
                config.pro_input_size,
            )));
            candidates.push(Arc::new(RelativeBackend::new(
                config.relative_model_path.clone(),
                config.relative_input_size,
            )));
        }
        candidates.push(Arc::new(LuminanceBackend::new(config.blur_radius)));

        let backends: Vec<Arc<dyn DepthBackend>> = candidates
            .into_iter()
            .filter(|backend| {
                if backend.available() {
                    true
                } else {
                    tracing::info!(
                        backend = backend.name(),
                        "backend not usable in this environment, excluded from registry"
                    );
                    false
                }
            })
            .collect();

        tracing::info!(
            backends = ?backends.iter().map(|b| b.name()).collect::<Vec<_>>(),
            "depth backend registry resolved"
        );

        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Decode the upload and produce a depth map from the first backend that
    /// succeeds. A single inference attempt per backend, no partial results.
    pub fn generate(&self, raw: &[u8]) -> Result<Depth, DepthError> {
        let image = loader::load(raw)?;
        let (width, height) = image.dimensions();

        let mut tried = Vec::new();
        for backend in &self.backends {
            let span = tracing::info_span!("depth_backend", backend = backend.name());
            let _enter = span.enter();

            let result = match backend.estimate(&image) {
                Ok(result) => result,
                Err(BackendError::Unavailable(reason)) => {
                    tracing::debug!(reason = %reason, "backend unavailable, trying next");
                    tried.push(BackendAttempt {
                        name: backend.name(),
                        reason: format!("unavailable: {reason}"),
                    });
                    continue;
                }
                Err(BackendError::Execution(error)) => {
                    tracing::warn!(error = %error, "backend failed, trying next");
                    tried.push(BackendAttempt {
                        name: backend.name(),
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            // A backend that produced an unencodable matrix (non-finite
            // values, zero area) counts as failed; the fallback continues.
            match encode::encode(&result.depth, result.convention) {
                Ok(depth_image) => {
                    tracing::info!(
                        width,
                        height,
                        focal_length_px = result.focal_length_px,
                        "depth map generated"
                    );
                    return Ok(Depth {
                        image: depth_image,
                        focal_length_px: result.focal_length_px,
                        backend: backend.name(),
                    });
                }
                Err(error) => {
                    tracing::warn!(error = %error, "backend output not encodable, trying next");
                    tried.push(BackendAttempt {
                        name: backend.name(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Err(DepthError::NoBackend { tried })
    }
}
