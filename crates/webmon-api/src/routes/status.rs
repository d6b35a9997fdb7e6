use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use webmon_core::{CycleResult, SiteConfig, SiteResult};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MonitorDetail {
    pub state: String,
    pub created_at: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    pub max_concurrent_probes: usize,
    pub cycles_completed: u64,
    pub last_cycle: Option<String>,
    pub sites: Vec<SiteConfig>,
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<CycleResult>, ApiError> {
    state.snapshots.read().await.map(Json).ok_or(ApiError::NoCycleYet)
}

/// GET /api/v1/status/{site_id}
pub async fn get_site_status(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<SiteResult>, ApiError> {
    let snapshot = state.snapshots.read().await.ok_or(ApiError::NoCycleYet)?;
    snapshot
        .results
        .into_iter()
        .find(|r| r.site.id == site_id)
        .map(Json)
        .ok_or(ApiError::UnknownSite(site_id))
}

/// GET /api/v1/monitor
pub async fn get_monitor(State(state): State<AppState>) -> Result<Json<MonitorDetail>, ApiError> {
    let monitor = state.monitor.as_ref().ok_or(ApiError::NoMonitor)?;
    let config = monitor.config();
    let last_cycle = state
        .snapshots
        .read()
        .await
        .map(|c| c.timestamp.to_rfc3339());

    Ok(Json(MonitorDetail {
        state: monitor.state().await.to_string(),
        created_at: monitor.created_at().to_rfc3339(),
        interval_secs: config.interval.as_secs(),
        timeout_secs: config.request_timeout.as_secs(),
        max_concurrent_probes: config.max_concurrent_probes,
        cycles_completed: monitor.cycles_completed(),
        last_cycle,
        sites: config.site_configs(),
    }))
}
