use std::fmt::Write;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use webmon_core::CycleResult;

use crate::state::AppState;

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut out = String::with_capacity(4096);

    if let Some(monitor) = &state.monitor {
        let current = monitor.state().await.to_string();
        writeln!(out, "# TYPE webmon_scheduler_state stateset").ok();
        writeln!(out, "# HELP webmon_scheduler_state Current state of the probe scheduler").ok();
        for variant in &["idle", "running", "stopped"] {
            writeln!(
                out,
                "webmon_scheduler_state{{state=\"{}\"}} {}",
                variant,
                if current == *variant { 1 } else { 0 }
            )
            .ok();
        }

        writeln!(out, "# TYPE webmon_sites gauge").ok();
        writeln!(out, "# HELP webmon_sites Number of configured sites").ok();
        writeln!(out, "webmon_sites {}", monitor.config().sites.len()).ok();

        writeln!(out, "# TYPE webmon_cycles counter").ok();
        writeln!(out, "# HELP webmon_cycles Probe cycles completed since start").ok();
        writeln!(out, "webmon_cycles_total {}", monitor.cycles_completed()).ok();

        writeln!(out, "# TYPE webmon_uptime_seconds gauge").ok();
        writeln!(out, "# HELP webmon_uptime_seconds Time since the monitor was created").ok();
        let uptime = (chrono::Utc::now() - monitor.created_at()).num_milliseconds() as f64 / 1000.0;
        writeln!(out, "webmon_uptime_seconds {:.3}", uptime).ok();
    }

    if let Some(cycle) = state.snapshots.read().await {
        write_cycle(&mut out, &cycle);
    }

    writeln!(out, "# EOF").ok();

    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        out,
    )
}

fn write_cycle(out: &mut String, cycle: &CycleResult) {
    writeln!(out, "# TYPE webmon_last_cycle_timestamp_seconds gauge").ok();
    writeln!(
        out,
        "# HELP webmon_last_cycle_timestamp_seconds Unix timestamp at which the last published cycle started"
    )
    .ok();
    let t = cycle.timestamp;
    let secs = t.timestamp() as f64 + (t.timestamp_subsec_millis() as f64 / 1000.0);
    writeln!(out, "webmon_last_cycle_timestamp_seconds {:.3}", secs).ok();

    let results = cycle.sorted_results();

    writeln!(out, "# TYPE webmon_site_up gauge").ok();
    writeln!(out, "# HELP webmon_site_up Whether the site answered the last probe").ok();
    for r in &results {
        writeln!(
            out,
            "webmon_site_up{{site_id=\"{}\"}} {}",
            label(&r.site.id),
            u8::from(r.up)
        )
        .ok();
    }

    writeln!(out, "# TYPE webmon_site_content_match gauge").ok();
    writeln!(out, "# HELP webmon_site_content_match Whether the response body matched the content pattern").ok();
    for r in &results {
        if let Some(matched) = r.matched {
            writeln!(
                out,
                "webmon_site_content_match{{site_id=\"{}\"}} {}",
                label(&r.site.id),
                u8::from(matched)
            )
            .ok();
        }
    }

    writeln!(out, "# TYPE webmon_site_status_code gauge").ok();
    writeln!(out, "# HELP webmon_site_status_code HTTP status code of the last response").ok();
    for r in &results {
        if let Some(code) = r.code {
            writeln!(out, "webmon_site_status_code{{site_id=\"{}\"}} {}", label(&r.site.id), code).ok();
        }
    }

    writeln!(out, "# TYPE webmon_site_response_seconds gauge").ok();
    writeln!(out, "# HELP webmon_site_response_seconds Duration of the last HTTP exchange").ok();
    for r in &results {
        if let Some(elapsed) = r.elapsed {
            writeln!(
                out,
                "webmon_site_response_seconds{{site_id=\"{}\"}} {:.6}",
                label(&r.site.id),
                elapsed
            )
            .ok();
        }
    }

    writeln!(out, "# TYPE webmon_site_failure gauge").ok();
    writeln!(out, "# HELP webmon_site_failure Transport failure of the last probe, by kind").ok();
    for r in &results {
        if let Some(kind) = r.error {
            writeln!(
                out,
                "webmon_site_failure{{site_id=\"{}\",kind=\"{}\"}} 1",
                label(&r.site.id),
                kind
            )
            .ok();
        }
    }
}

/// Escape a label value per the OpenMetrics text format.
fn label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
