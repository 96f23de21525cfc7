//! YAML configuration loaded from `CONFIG_PATH` (spec §6), same
//! `config::Config::builder()` + `config::File` pattern as the backend.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub backend: BackendConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub port: u16,
}

impl AppConfig {
    /// Loads the YAML file at `CONFIG_PATH` (default `config/config.yaml`).
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("parsing config from {}", path.display()))
    }
}
