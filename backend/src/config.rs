//! YAML configuration loaded from `CONFIG_PATH` (spec §6), grounded in the
//! corpus's `config::Config::builder()` + `config::File` pattern.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub postgresql: PostgresConfig,
    pub jwt: JwtConfig,
    pub grpc: GrpcConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
}

fn default_sslmode() -> String {
    "disable".to_owned()
}

impl PostgresConfig {
    pub fn dsn(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.db, self.sslmode
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    ttl: String,
}

impl JwtConfig {
    pub fn ttl(&self) -> Result<Duration> {
        parse_duration(&self.ttl)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrpcConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub driver: StorageDriver,
}

impl AppConfig {
    /// Loads the YAML file at `CONFIG_PATH` (default
    /// `config/config.yaml`). `CONFIG_PATH` is the only environment
    /// variable this process reads for configuration (spec §6).
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

/// Parses a compact duration string like `"24h"`, `"30m"`, `"1h30m"`, or
/// `"45s"` — the subset of Go's `time.Duration` syntax the source's YAML
/// config files actually use.
fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("empty duration");
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            digits.push(ch);
            continue;
        }
        if digits.is_empty() {
            bail!("invalid duration `{raw}`: expected a number before unit `{ch}`");
        }
        let value: f64 = digits.parse().with_context(|| format!("invalid number in duration `{raw}`"))?;
        digits.clear();
        let unit = match ch {
            'h' => Duration::from_secs_f64(value * 3600.0),
            'm' => Duration::from_secs_f64(value * 60.0),
            's' => Duration::from_secs_f64(value),
            other => bail!("invalid duration `{raw}`: unsupported unit `{other}`"),
        };
        total += unit;
    }
    if !digits.is_empty() {
        bail!("invalid duration `{raw}`: trailing number with no unit");
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn parses_compound_durations() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
    }
}
