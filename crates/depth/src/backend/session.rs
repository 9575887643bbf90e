use crate::error::BackendError;
use once_cell::sync::OnceCell;
use ort::session::{Session, builder::GraphOptimizationLevel};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Lazily loaded, process-wide ONNX session.
///
/// Model load is the expensive step and must happen at most effectively once
/// per process: `OnceCell::get_or_try_init` serializes racing first loads,
/// and a failed load is retried on the next request rather than cached.
/// The `Mutex` is for ort's mutable `run`.
pub(crate) struct LazySession {
    model_path: PathBuf,
    cell: OnceCell<Mutex<Session>>,
}

impl LazySession {
    pub(crate) fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            cell: OnceCell::new(),
        }
    }

    pub(crate) fn available(&self) -> bool {
        self.model_path.is_file()
    }

    pub(crate) fn get(&self) -> Result<&Mutex<Session>, BackendError> {
        if !self.available() {
            return Err(BackendError::Unavailable(format!(
                "model file not found at {}",
                self.model_path.display()
            )));
        }
        self.cell.get_or_try_init(|| {
            load_session(&self.model_path)
                .map(Mutex::new)
                .map_err(BackendError::Execution)
        })
    }
}

fn load_session(path: &Path) -> anyhow::Result<Session> {
    // Idempotent runtime init
    let _ = ort::init().commit();

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(ort::Error::<()>::from)?
        .with_intra_threads(4)
        .map_err(ort::Error::<()>::from)?;

    #[cfg(feature = "cuda")]
    let builder = {
        tracing::info!("registering CUDA execution provider (runtime falls back to CPU)");
        builder.with_execution_providers([
            ort::execution_providers::CUDAExecutionProvider::default()
                .with_device_id(0)
                .build(),
        ])?
    };

    let session = builder.commit_from_file(path)?;
    tracing::info!(path = %path.display(), "model loaded");
    Ok(session)
}
