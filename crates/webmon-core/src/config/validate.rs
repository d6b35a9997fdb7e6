use thiserror::Error;

use super::RawMonitorConfig;
use crate::monitor::ContentPattern;

/// A single problem found in a raw configuration. Any violation is fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("interval value must be defined")]
    MissingInterval,
    #[error("interval must be a positive number of seconds")]
    ZeroInterval,
    #[error("a list of sites to be monitored must be defined")]
    MissingSites,
    #[error("{site} invalid: {field} missing")]
    MissingSiteField { site: String, field: &'static str },
    #[error("{site} invalid: url {url} is not a valid http(s) URL ({reason})")]
    InvalidUrl {
        site: String,
        url: String,
        reason: String,
    },
    #[error("{site} invalid: content pattern does not compile ({reason})")]
    InvalidPattern { site: String, reason: String },
    #[error("timeout must be a positive number of seconds")]
    ZeroTimeout,
}

/// Check a raw configuration for required fields and well-formed values.
///
/// Does not stop at the first problem: every violation is returned, in
/// order (interval, timeout, sites, then each site by id).
pub fn validate(config: &RawMonitorConfig) -> Vec<ConfigViolation> {
    let mut violations = Vec::new();

    match config.interval {
        None => violations.push(ConfigViolation::MissingInterval),
        Some(0) => violations.push(ConfigViolation::ZeroInterval),
        Some(_) => {}
    }

    if config.timeout == Some(0) {
        violations.push(ConfigViolation::ZeroTimeout);
    }

    let Some(sites) = &config.sites else {
        violations.push(ConfigViolation::MissingSites);
        return violations;
    };

    for (id, site) in sites {
        let missing = [
            ("url", site.url.is_none()),
            ("content", site.content.is_none()),
            ("full_match", site.full_match.is_none()),
        ];
        for (field, absent) in missing {
            if absent {
                violations.push(ConfigViolation::MissingSiteField {
                    site: id.clone(),
                    field,
                });
            }
        }

        if let Some(url) = &site.url {
            if let Err(reason) = check_url(url) {
                violations.push(ConfigViolation::InvalidUrl {
                    site: id.clone(),
                    url: url.clone(),
                    reason,
                });
            }
        }

        if let Some(content) = &site.content {
            let full_match = site.full_match.unwrap_or(false);
            if let Err(e) = ContentPattern::compile(content, full_match) {
                violations.push(ConfigViolation::InvalidPattern {
                    site: id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    violations
}

fn check_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
