use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::fetch::FailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

impl MonitorState {
    /// A stopped monitor is final; build a new one to resume monitoring.
    pub fn can_transition_to(self, target: MonitorState) -> bool {
        matches!(
            (self, target),
            (MonitorState::Idle, MonitorState::Running)
                | (MonitorState::Running, MonitorState::Stopped)
        )
    }
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outcome of probing one site in one cycle.
///
/// `code`, `elapsed` and `matched` are only set when a response was received;
/// `error` only when it was not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteResult {
    pub site: SiteConfig,
    pub up: bool,
    pub error: Option<FailureKind>,
    pub code: Option<u16>,
    /// Seconds from sending the request to receiving the last body byte.
    pub elapsed: Option<f64>,
    #[serde(rename = "match")]
    pub matched: Option<bool>,
}

impl SiteResult {
    pub fn reached(site: SiteConfig, code: u16, elapsed: f64, matched: bool) -> Self {
        Self {
            site,
            up: true,
            error: None,
            code: Some(code),
            elapsed: Some(elapsed),
            matched: Some(matched),
        }
    }

    pub fn unreachable(site: SiteConfig, error: FailureKind) -> Self {
        Self {
            site,
            up: false,
            error: Some(error),
            code: None,
            elapsed: None,
            matched: None,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site.id
    }

    /// Up and serving the expected content.
    pub fn is_healthy(&self) -> bool {
        self.up && self.matched == Some(true)
    }
}

/// One complete probe cycle: the unit published to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub id: Uuid,
    /// When the cycle started, before any probe was dispatched.
    pub timestamp: DateTime<Utc>,
    /// One entry per configured site, in completion order.
    pub results: Vec<SiteResult>,
}

impl CycleResult {
    pub fn new(timestamp: DateTime<Utc>, results: Vec<SiteResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn up_count(&self) -> usize {
        self.results.iter().filter(|r| r.up).count()
    }

    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.matched == Some(true)).count()
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteResult> {
        self.results.iter().find(|r| r.site.id == site_id)
    }

    /// Results ordered by site id, for stable presentation.
    pub fn sorted_results(&self) -> Vec<&SiteResult> {
        let mut sorted: Vec<&SiteResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| a.site.id.cmp(&b.site.id));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str) -> SiteConfig {
        SiteConfig {
            id: id.into(),
            url: format!("https://{}.example.com/", id),
            content: "ok".into(),
            full_match: false,
        }
    }

    #[test]
    fn valid_state_transitions() {
        assert!(MonitorState::Idle.can_transition_to(MonitorState::Running));
        assert!(MonitorState::Running.can_transition_to(MonitorState::Stopped));
    }

    #[test]
    fn invalid_state_transitions() {
        assert!(!MonitorState::Idle.can_transition_to(MonitorState::Stopped));
        assert!(!MonitorState::Running.can_transition_to(MonitorState::Idle));
        assert!(!MonitorState::Running.can_transition_to(MonitorState::Running));
        assert!(!MonitorState::Stopped.can_transition_to(MonitorState::Running));
        assert!(!MonitorState::Stopped.can_transition_to(MonitorState::Idle));
    }

    #[test]
    fn unreachable_result_leaves_response_fields_empty() {
        let r = SiteResult::unreachable(site("down"), FailureKind::Connection);
        assert!(!r.up);
        assert_eq!(r.error, Some(FailureKind::Connection));
        assert!(r.code.is_none());
        assert!(r.elapsed.is_none());
        assert!(r.matched.is_none());
        assert!(!r.is_healthy());
    }

    #[test]
    fn result_serializes_match_field() {
        let r = SiteResult::reached(site("web"), 500, 0.25, true);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["up"], true);
        assert_eq!(json["code"], 500);
        assert_eq!(json["match"], true);
        assert!(json["error"].is_null());
        assert_eq!(json["site"]["id"], "web");

        let down = SiteResult::unreachable(site("down"), FailureKind::Timeout);
        let json = serde_json::to_value(&down).unwrap();
        assert_eq!(json["error"], "timeout");
        assert!(json["match"].is_null());
    }

    #[test]
    fn cycle_counts_and_lookup() {
        let cycle = CycleResult::new(
            Utc::now(),
            vec![
                SiteResult::reached(site("b"), 200, 0.1, true),
                SiteResult::reached(site("a"), 404, 0.1, false),
                SiteResult::unreachable(site("c"), FailureKind::Timeout),
            ],
        );
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.up_count(), 2);
        assert_eq!(cycle.matched_count(), 1);
        assert_eq!(cycle.get("a").and_then(|r| r.code), Some(404));
        assert!(cycle.get("zzz").is_none());
        let ids: Vec<&str> = cycle.sorted_results().iter().map(|r| r.site_id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
