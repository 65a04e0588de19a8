use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Controller address without path, e.g. `http://192.168.1.80`
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub device: Device,
}

impl Settings {
    pub fn new() -> Result<Self> {
        Self::from_toml(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(source)?;

        let trimmed = settings.device.base_url.trim_end_matches('/').len();
        settings.device.base_url.truncate(trimmed);

        Ok(settings)
    }
}
