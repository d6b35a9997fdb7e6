use regex::Regex;
use tokio::time::Instant;
use tracing::warn;

use crate::config::Site;
use crate::fetch::Fetcher;
use crate::monitor::state::SiteResult;

/// Compiled content pattern for one site.
///
/// An anchored pattern must match at offset 0 of the body but need not
/// consume all of it. The pattern is compiled as written; anchoring is
/// applied when matching.
#[derive(Debug, Clone)]
pub struct ContentPattern {
    regex: Regex,
    anchored: bool,
}

impl ContentPattern {
    pub fn compile(pattern: &str, anchored: bool) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self { regex, anchored })
    }

    pub fn is_match(&self, body: &str) -> bool {
        if self.anchored {
            // the leftmost match starts at 0 whenever any match does
            self.regex.find(body).is_some_and(|m| m.start() == 0)
        } else {
            self.regex.is_match(body)
        }
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }
}

/// Probe one site with a single GET. Never fails: transport errors become
/// an `up = false` result.
pub async fn probe(site: &Site, fetcher: &dyn Fetcher) -> SiteResult {
    let started = Instant::now();
    match fetcher.fetch(&site.config.url).await {
        Ok(response) => {
            let elapsed = started.elapsed().as_secs_f64();
            let matched = site.pattern.is_match(&response.body);
            SiteResult::reached(site.config.clone(), response.status, elapsed, matched)
        }
        Err(e) => {
            warn!(site_id = %site.id(), url = %site.config.url, error = %e, "Site probe failed");
            SiteResult::unreachable(site.config.clone(), e.kind())
        }
    }
}
