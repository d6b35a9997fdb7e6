#![forbid(unsafe_code)]

pub mod config;
pub mod fetch;
pub mod monitor;

pub use config::{
    validate, ConfigError, ConfigViolation, MonitorConfig, RawMonitorConfig, RawSiteConfig, Site,
    SiteConfig,
};
pub use fetch::{FailureKind, FetchedResponse, Fetcher, HttpFetcher, TransportError};
pub use monitor::{
    probe, run_cycle, ContentPattern, CycleResult, Monitor, MonitorState, SchedulerError,
    SiteResult, SnapshotStore,
};
