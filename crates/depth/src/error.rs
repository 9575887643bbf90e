use thiserror::Error;

/// One failed backend trial, kept for the terminal error chain.
#[derive(Debug)]
pub struct BackendAttempt {
    pub name: &'static str,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum DepthError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    #[error("all depth backends failed: {}", render_attempts(tried))]
    NoBackend { tried: Vec<BackendAttempt> },

    #[error("failed to write depth map: {0}")]
    Write(image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend cannot run in this environment (e.g. model file absent).
    /// Expected during fallback, never surfaced to the caller.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend is installed but inference failed.
    #[error("backend execution failed: {0}")]
    Execution(#[from] anyhow::Error),
}

fn render_attempts(tried: &[BackendAttempt]) -> String {
    if tried.is_empty() {
        return "no backends registered".to_string();
    }
    tried
        .iter()
        .map(|a| format!("{}: {}", a.name, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
