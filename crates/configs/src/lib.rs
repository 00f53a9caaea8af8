use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_participants_directory")]
    pub participants_directory: PathBuf,
    /// Year used by the routes that carry no `{year}` segment.
    #[serde(default)]
    pub default_year: Option<i32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { participants_directory: default_participants_directory(), default_year: None }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_participants_directory() -> PathBuf { PathBuf::from("participants") }

/// Flat camelCase keys accepted at the top level of JSON settings files.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FlatSettings {
    participants_directory: Option<PathBuf>,
    port_number: Option<PortValue>,
    ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

impl PortValue {
    fn to_port(&self) -> Result<u16> {
        match self {
            PortValue::Number(n) => Ok(*n),
            PortValue::Text(s) => s
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("portNumber {s:?} is not a valid port: {e}")),
        }
    }
}

/// Load settings: defaults when `path` is `None`, otherwise the given file.
/// Environment overrides are applied last, then the result is validated.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let mut cfg = match path {
        Some(p) => load_from_file(p)?,
        None => AppConfig::default(),
    };
    cfg.apply_env_overrides()?;
    cfg.normalize_and_validate()?;
    Ok(cfg)
}

/// Parse a settings file; `.json` files go through serde_json, everything else is TOML.
pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        from_json_str(&content).with_context(|| format!("invalid settings file {}", path.display()))
    } else {
        from_toml_str(&content).with_context(|| format!("invalid settings file {}", path.display()))
    }
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

pub fn from_json_str(content: &str) -> Result<AppConfig> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let mut cfg: AppConfig = serde_json::from_value(value.clone())?;
    let flat: FlatSettings = serde_json::from_value(value)?;
    if let Some(dir) = flat.participants_directory {
        cfg.storage.participants_directory = dir;
    }
    if let Some(port) = flat.port_number {
        cfg.server.port = port.to_port()?;
    }
    if let Some(ip) = flat.ip_address {
        cfg.server.host = ip;
    }
    Ok(cfg)
}

impl AppConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay `SERVER_HOST`, `SERVER_PORT`, `PARTICIPANTS_DIR` and `DEFAULT_YEAR`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow!("SERVER_PORT {port:?} is not a valid port: {e}"))?;
        }
        if let Some(dir) = lookup("PARTICIPANTS_DIR") {
            self.storage.participants_directory = PathBuf::from(dir);
        }
        if let Some(year) = lookup("DEFAULT_YEAR") {
            let year = year
                .trim()
                .parse()
                .map_err(|e| anyhow!("DEFAULT_YEAR {year:?} is not a valid year: {e}"))?;
            self.storage.default_year = Some(year);
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.participants_directory.as_os_str().is_empty() {
            return Err(anyhow!("storage.participants_directory must not be empty"));
        }
        Ok(())
    }

    /// The configured default year, or the current UTC calendar year.
    pub fn resolved_default_year(&self) -> i32 {
        self.default_year.unwrap_or_else(|| chrono::Utc::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_original_deployment() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.participants_directory, PathBuf::from("participants"));
        assert_eq!(cfg.logging.format, LogFormat::Compact);
    }

    #[test]
    fn parses_nested_toml() {
        let cfg = from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8081
            worker_threads = 2

            [storage]
            participants_directory = "/var/lib/flies"
            default_year = 2019

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.storage.resolved_default_year(), 2019);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn parses_flat_json_keys() {
        let cfg = from_json_str(
            r#"{"participantsDirectory":"data","portNumber":"6000","ipAddress":""}"#,
        )
        .unwrap();
        assert_eq!(cfg.storage.participants_directory, PathBuf::from("data"));
        assert_eq!(cfg.server.port, 6000);

        let mut cfg = cfg;
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn numeric_port_in_json() {
        let cfg = from_json_str(r#"{"portNumber": 7000}"#).unwrap();
        assert_eq!(cfg.server.port, 7000);
    }

    #[test]
    fn malformed_settings_are_errors() {
        assert!(from_json_str("{not json").is_err());
        assert!(from_json_str(r#"{"portNumber":"eighty"}"#).is_err());
        assert!(from_toml_str("[server\nport = 1").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("flies-settings-that-does-not-exist.json");
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_HOST", "10.0.0.1"),
            ("SERVER_PORT", "9000"),
            ("PARTICIPANTS_DIR", "/tmp/p"),
            ("DEFAULT_YEAR", "2021"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.bind_addr(), "10.0.0.1:9000");
        assert_eq!(cfg.storage.participants_directory, PathBuf::from("/tmp/p"));
        assert_eq!(cfg.storage.default_year, Some(2021));

        let mut cfg = AppConfig::default();
        assert!(cfg.apply_overrides_from(|k| (k == "SERVER_PORT").then(|| "x".to_string())).is_err());
    }

    #[test]
    fn rejects_zero_port() {
        let mut cfg = from_toml_str("[server]\nport = 0").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
