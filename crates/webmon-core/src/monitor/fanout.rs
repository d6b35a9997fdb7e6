use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::fetch::Fetcher;
use crate::monitor::probe::probe;
use crate::monitor::state::{CycleResult, SiteResult};

/// Probe every configured site once, at most `max_concurrent_probes` at a
/// time, and return only when all of them have finished.
pub async fn run_cycle(config: &MonitorConfig, fetcher: &dyn Fetcher) -> CycleResult {
    let timestamp = Utc::now();
    let started = Instant::now();
    let concurrency = config.max_concurrent_probes.max(1);
    debug!(sites = config.sites.len(), concurrency, "Starting probe cycle");

    let probes: Vec<_> = config
        .sites
        .values()
        .map(|site| probe(site, fetcher))
        .collect();
    let results: Vec<SiteResult> = stream::iter(probes)
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let cycle = CycleResult::new(timestamp, results);
    log_cycle(&cycle, started);
    cycle
}

fn log_cycle(cycle: &CycleResult, started: Instant) {
    for r in &cycle.results {
        info!(
            cycle_id = %cycle.id,
            site_id = %r.site.id,
            url = %r.site.url,
            up = r.up,
            code = ?r.code,
            elapsed = ?r.elapsed,
            matched = ?r.matched,
            error = ?r.error.map(|e| e.as_str()),
            "Site result"
        );
    }
    info!(
        cycle_id = %cycle.id,
        sites = cycle.len(),
        up = cycle.up_count(),
        matched = cycle.matched_count(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Probe cycle complete"
    );
}
