//! Server-rendered HTML status page for the latest probe cycle.

use askama::Template;
use axum::extract::State;
use axum::response::Html;

use webmon_core::{CycleResult, SiteResult};

use crate::state::AppState;

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    summary: Option<CycleSummary>,
    rows: Vec<SiteRow>,
}

struct CycleSummary {
    checked_at: String,
    up: usize,
    total: usize,
    matched: usize,
}

/// One table row, with every cell already formatted.
struct SiteRow {
    id: String,
    url: String,
    up: bool,
    failure: &'static str,
    code: String,
    elapsed: String,
    content_class: &'static str,
    content_label: &'static str,
}

impl SiteRow {
    fn from_result(r: &SiteResult) -> Self {
        let (content_class, content_label) = match r.matched {
            Some(true) => ("up", "match"),
            Some(false) => ("miss", "no match"),
            None => ("", ""),
        };
        Self {
            id: r.site.id.clone(),
            url: r.site.url.clone(),
            up: r.up,
            failure: r.error.map(|e| e.as_str()).unwrap_or("unknown"),
            code: r.code.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
            elapsed: r
                .elapsed
                .map(|e| format!("{:.3}s", e))
                .unwrap_or_else(|| "-".into()),
            content_class,
            content_label,
        }
    }
}

/// GET /webmonitor/
pub async fn status_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshots.read().await;
    Html(render(snapshot.as_ref()))
}

pub fn render(snapshot: Option<&CycleResult>) -> String {
    let tmpl = match snapshot {
        Some(cycle) => StatusTemplate {
            summary: Some(CycleSummary {
                checked_at: cycle.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                up: cycle.up_count(),
                total: cycle.len(),
                matched: cycle.matched_count(),
            }),
            rows: cycle
                .sorted_results()
                .into_iter()
                .map(SiteRow::from_result)
                .collect(),
        },
        None => StatusTemplate {
            summary: None,
            rows: Vec::new(),
        },
    };

    tmpl.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to render status page");
        format!("<pre>Template error: {e}</pre>")
    })
}
