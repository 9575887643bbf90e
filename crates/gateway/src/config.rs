use common::{Environment, LogLevel};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize)]
pub struct Config {
    pub log_level: LogLevel,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub outputs_dir: PathBuf,
    pub pro_model_path: PathBuf,
    pub pro_input_size: u32,
    pub relative_model_path: PathBuf,
    pub relative_input_size: u32,
    pub blur_radius: f32,
}

impl Config {
    pub fn pipeline_config(&self) -> depth::PipelineConfig {
        depth::PipelineConfig {
            pro_model_path: self.pro_model_path.clone(),
            pro_input_size: self.pro_input_size,
            relative_model_path: self.relative_model_path.clone(),
            relative_input_size: self.relative_input_size,
            blur_radius: self.blur_radius,
        }
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let config = config::Config::builder()
        .set_default("log_level", "info")?
        .set_default("environment", "development")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8000_i64)?
        .set_default("outputs_dir", "outputs")?
        .set_default("pro_model_path", "models/depth_pro.onnx")?
        .set_default("pro_input_size", 1536_i64)?
        .set_default("relative_model_path", "models/dpt_hybrid.onnx")?
        .set_default("relative_input_size", 384_i64)?
        .set_default("blur_radius", 10.0_f64)?
        .add_source(
            config::Environment::with_prefix("DEPTH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize::<Config>()
}
