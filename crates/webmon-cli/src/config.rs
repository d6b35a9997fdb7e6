//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! interval = 60
//! timeout = 30
//! concurrency = 4
//!
//! [server]
//! listen = "127.0.0.1:8080"
//! log_format = "pretty"
//!
//! [sites.example]
//! url = "https://example.com/"
//! content = "Example Domain"
//! full_match = false
//!
//! [sites.status]
//! url = "https://status.example.com/health"
//! content = "OK"
//! full_match = true
//! ```
//!
//! Monitoring keys are kept raw here; required fields are checked by
//! [`webmon_core::validate`] so that every missing key is reported.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use webmon_core::RawMonitorConfig;

pub const DEFAULT_CONFIG_PATH: &str = "./web_monitor.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(flatten)]
    pub monitor: RawMonitorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            log_format: default_log_format(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_log_format() -> String {
    "pretty".into()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        Self::parse(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: AppConfig = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        match self.server.log_format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(format!(
                "Invalid log_format '{}': must be 'pretty' or 'json'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use webmon_core::{validate, ConfigViolation, MonitorConfig};

    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
interval = 30

[sites.example]
url = "https://example.com/"
content = "Example Domain"
full_match = false
"#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.server.listen, default_listen());
        assert_eq!(config.server.log_format, "pretty");
        assert_eq!(config.monitor.interval, Some(30));

        let monitor = MonitorConfig::from_raw(config.monitor).unwrap();
        assert_eq!(monitor.interval, Duration::from_secs(30));
        assert_eq!(monitor.sites.len(), 1);
        assert_eq!(monitor.sites["example"].config.content, "Example Domain");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
interval = 120
timeout = 10
concurrency = 8

[server]
listen = "0.0.0.0:9090"
log_format = "json"

[sites.shop]
url = "https://shop.example.com/"
content = "Add to cart"
full_match = false

[sites.api]
url = "https://api.example.com/health"
content = '\{"status":\s*"ok"'
full_match = true
"#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.server.listen.port(), 9090);
        assert_eq!(config.server.log_format, "json");

        let monitor = MonitorConfig::from_raw(config.monitor).unwrap();
        assert_eq!(monitor.request_timeout, Duration::from_secs(10));
        assert_eq!(monitor.max_concurrent_probes, 8);
        let api = &monitor.sites["api"];
        assert!(api.config.full_match);
        assert!(api.pattern.is_match("{\"status\": \"ok\"}"));
    }

    #[test]
    fn missing_keys_are_left_for_validation() {
        let toml = r#"
[sites.partial]
url = "https://partial.example.com/"
"#;
        let config = AppConfig::parse(toml).unwrap();
        let violations = validate(&config.monitor);
        assert_eq!(
            violations,
            vec![
                ConfigViolation::MissingInterval,
                ConfigViolation::MissingSiteField { site: "partial".into(), field: "content" },
                ConfigViolation::MissingSiteField { site: "partial".into(), field: "full_match" },
            ]
        );
    }

    #[test]
    fn missing_sites_is_reported() {
        let config = AppConfig::parse("interval = 10\n").unwrap();
        assert_eq!(validate(&config.monitor), vec![ConfigViolation::MissingSites]);
    }

    #[test]
    fn wrong_value_type_fails_to_parse() {
        let toml = r#"
interval = "often"
"#;
        assert!(AppConfig::parse(toml).is_err());
    }

    #[test]
    fn rejects_invalid_log_format() {
        let toml = r#"
interval = 10

[server]
log_format = "xml"
"#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.contains("Invalid log_format"), "{}", err);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/web_monitor.toml")).unwrap_err();
        assert!(err.contains("Failed to read config file"), "{}", err);
    }
}
