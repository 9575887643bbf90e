pub mod backend;
pub mod encode;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod store;

pub use backend::{BackendResult, DepthBackend};
pub use encode::{DepthConvention, DepthMatrix, encode};
pub use error::{BackendError, DepthError};
pub use pipeline::{Depth, DepthPipeline, PipelineConfig};
pub use store::OutputStore;
