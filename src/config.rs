use serde::Deserialize;
use std::fs;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TOKEN_BOARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub pump_soon: PumpSoonConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback_price")]
    pub fallback_price: f64,
    #[serde(default = "default_image_gateway")]
    pub image_gateway: String,
    #[serde(default = "default_view")]
    pub view: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_overview_interval_secs")]
    pub overview_interval_secs: u64,
    #[serde(default = "default_movers_limit")]
    pub movers_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PumpSoonConfig {
    /// Newly Created pages scanned at most per universe build.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_push_interval_secs")]
    pub push_interval_secs: u64,
}

fn default_timeout_secs() -> u64 { 10 }
fn default_fallback_price() -> f64 { 0.377216 }
fn default_image_gateway() -> String { "https://gateway.pinata.cloud/ipfs".to_string() }
fn default_view() -> String { "grid".to_string() }
fn default_page_size() -> usize { 20 }
fn default_poll_interval_secs() -> u64 { 5 }
fn default_overview_interval_secs() -> u64 { 30 }
fn default_movers_limit() -> usize { 5 }
fn default_max_pages() -> u32 { 200 }
fn default_push_interval_secs() -> u64 { 5 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            poll_interval_secs: default_poll_interval_secs(),
            overview_interval_secs: default_overview_interval_secs(),
            movers_limit: default_movers_limit(),
        }
    }
}

impl Default for PumpSoonConfig {
    fn default() -> Self {
        Self { max_pages: default_max_pages() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("dashboard.page_size", self.dashboard.page_size as u64),
            ("dashboard.poll_interval_secs", self.dashboard.poll_interval_secs),
            ("dashboard.overview_interval_secs", self.dashboard.overview_interval_secs),
            ("pump_soon.max_pages", self.pump_soon.max_pages as u64),
            ("server.push_interval_secs", self.server.push_interval_secs),
            ("upstream.timeout_secs", self.upstream.timeout_secs),
        ];
        match checks.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Zero(name)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [upstream]
        base_url = "https://api.example.com"

        [server]
        host = "127.0.0.1"
        port = 3000
    "#;

    #[test]
    fn missing_sections_take_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.dashboard.page_size, 20);
        assert_eq!(config.dashboard.poll_interval_secs, 5);
        assert_eq!(config.dashboard.overview_interval_secs, 30);
        assert_eq!(config.pump_soon.max_pages, 200);
        assert_eq!(config.upstream.fallback_price, 0.377216);
        assert_eq!(config.upstream.view, "grid");
        assert_eq!(config.server.push_interval_secs, 5);
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let content = format!("{}\n[dashboard]\npoll_interval_secs = 0\n", MINIMAL);
        match Config::from_toml(&content) {
            Err(ConfigError::Zero(name)) => assert_eq!(name, "dashboard.poll_interval_secs"),
            other => panic!("expected zero-value error, got {:?}", other),
        }
    }

    #[test]
    fn missing_upstream_fails_to_parse() {
        let result = Config::from_toml("[server]\nhost = \"0.0.0.0\"\nport = 1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
