mod validate;

pub use validate::{validate, ConfigViolation};

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitor::ContentPattern;

/// Per-probe HTTP timeout used when the configuration does not set one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of probes allowed in flight at once during a cycle.
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 4;

/// One monitored target, echoed back in every result for identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub url: String,
    /// Regular expression searched for in the response body.
    pub content: String,
    /// Anchor the pattern at the start of the body instead of searching anywhere.
    pub full_match: bool,
}

/// A site whose content pattern has already been compiled.
#[derive(Debug, Clone)]
pub struct Site {
    pub config: SiteConfig,
    pub pattern: ContentPattern,
}

impl Site {
    pub fn new(config: SiteConfig) -> Result<Self, regex::Error> {
        let pattern = ContentPattern::compile(&config.content, config.full_match)?;
        Ok(Self { config, pattern })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }
}

/// Configuration as read from the config source, before validation.
///
/// Every field is optional so that missing keys surface as
/// [`ConfigViolation`]s instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMonitorConfig {
    /// Seconds between probe cycles.
    pub interval: Option<u64>,
    pub sites: Option<BTreeMap<String, RawSiteConfig>>,
    /// Per-probe timeout in seconds.
    pub timeout: Option<u64>,
    /// Maximum number of probes in flight at once.
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSiteConfig {
    pub url: Option<String>,
    pub content: Option<String>,
    pub full_match: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {}", summarize(.0))]
    Invalid(Vec<ConfigViolation>),
    #[error("interval override must be a positive number of seconds")]
    InvalidInterval,
}

fn summarize(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated monitoring configuration. Immutable once the monitor starts.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between the start of one probe cycle and the start of the next.
    pub interval: Duration,
    pub request_timeout: Duration,
    pub max_concurrent_probes: usize,
    pub sites: BTreeMap<String, Site>,
}

impl MonitorConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            sites: BTreeMap::new(),
        }
    }

    /// Validate a raw configuration and build the engine configuration from it.
    ///
    /// All violations are collected; none of them are recoverable.
    pub fn from_raw(raw: RawMonitorConfig) -> Result<Self, ConfigError> {
        let violations = validate(&raw);
        if !violations.is_empty() {
            return Err(ConfigError::Invalid(violations));
        }

        let (Some(interval), Some(sites)) = (raw.interval, raw.sites) else {
            return Err(ConfigError::Invalid(vec![ConfigViolation::MissingInterval]));
        };

        let mut config = Self::new(Duration::from_secs(interval));
        if let Some(timeout) = raw.timeout {
            config = config.with_request_timeout(Duration::from_secs(timeout));
        }
        if let Some(concurrency) = raw.concurrency {
            config = config.with_max_concurrent_probes(concurrency);
        }

        for (id, raw_site) in sites {
            let site_config = SiteConfig {
                id: id.clone(),
                url: raw_site.url.unwrap_or_default(),
                content: raw_site.content.unwrap_or_default(),
                full_match: raw_site.full_match.unwrap_or_default(),
            };
            let site = Site::new(site_config).map_err(|e| {
                ConfigError::Invalid(vec![ConfigViolation::InvalidPattern {
                    site: id.clone(),
                    reason: e.to_string(),
                }])
            })?;
            config.sites.insert(id, site);
        }

        Ok(config)
    }

    /// Replace the interval with a command-line value.
    pub fn with_interval_override(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        self.interval = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.max_concurrent_probes = max.max(1);
        self
    }

    pub fn with_site(mut self, site: Site) -> Self {
        self.sites.insert(site.config.id.clone(), site);
        self
    }

    pub fn site_configs(&self) -> Vec<SiteConfig> {
        self.sites.values().map(|s| s.config.clone()).collect()
    }
}
