use depth::{DepthPipeline, OutputStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DepthPipeline>,
    pub store: Arc<OutputStore>,
}
