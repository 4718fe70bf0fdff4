use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub upload: UploadSettings,
    pub progress: ProgressSettings,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the analysis service; `/analyze` is appended to it.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_image_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSettings {
    pub tick_interval_ms: u64,
    pub max_increment: f32,
    pub cap: f32,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 300,
            max_increment: 20.0,
            cap: 90.0,
        }
    }
}

impl ProgressSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Settings {
    /// Loads settings from an optional `idfi.toml` and `IDFI_*` environment
    /// variables (`IDFI_API__BASE_URL`, `IDFI_PROGRESS__CAP`, ...).
    pub fn load() -> Result<Self, AppError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("idfi").required(false))
            .add_source(
                Environment::with_prefix("IDFI")
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::from_builder(builder)
    }

    /// Builder pre-populated with every default. `api.base_url` has none.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, AppError> {
        let upload = UploadSettings::default();
        let progress = ProgressSettings::default();
        Ok(Config::builder()
            .set_default("upload.max_image_bytes", upload.max_image_bytes)?
            .set_default("progress.tick_interval_ms", progress.tick_interval_ms)?
            .set_default("progress.max_increment", progress.max_increment as f64)?
            .set_default("progress.cap", progress.cap as f64)?
            .set_default("log_level", "info")?)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.api.base_url.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "api.base_url must not be empty".to_string(),
            )));
        }
        Ok(settings)
    }
}
