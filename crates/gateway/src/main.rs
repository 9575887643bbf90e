use depth::{DepthPipeline, OutputStore};
use gateway::{config::get_configuration, logging::setup_logging, routes::app, state::AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration()?;
    setup_logging(&config);

    tracing::info!(
        environment = config.environment.as_str(),
        "starting depth gateway"
    );

    let pipeline = DepthPipeline::with_default_backends(&config.pipeline_config());
    let store = OutputStore::open(&config.outputs_dir)?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        store: Arc::new(store),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
