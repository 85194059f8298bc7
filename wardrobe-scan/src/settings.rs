use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Service {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Scan {
    pub interval_ms: u64,
    pub capture_dir: String,
    pub height_cm: Option<f64>,
}

impl Scan {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub service: Service,
    pub scan: Scan,
    pub log: Log,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("current directory: {e}")))?;
        Self::from_dir(base_path.join("config"))
    }

    /// Layers `settings.toml`, an optional `local.toml` and `WARDROBE__*`
    /// environment variables over the built-in defaults. `settings.toml` must exist.
    pub fn from_dir(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let s = Config::builder()
            .set_default("service.url", "http://127.0.0.1:5001/scan")?
            .set_default("scan.interval_ms", 2000)?
            .set_default("scan.capture_dir", "frames")?
            .set_default("log.level", "info")?
            .add_source(File::from(config_dir.join("settings.toml")))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(config::Environment::with_prefix("WARDROBE").separator("__"))
            .build()?;

        let settings: Self = s.try_deserialize()?;
        if settings.scan.interval_ms == 0 {
            return Err(ConfigError::Message(
                "scan.interval_ms must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }
}
