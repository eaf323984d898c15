// Tracker detection: counts outbound references to blacklisted hosts
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

use crate::filtering::blacklist::TrackerBlacklist;
use crate::filtering::types::CandidateResult;

/// Elements and attributes that carry outbound references
const REFERENCE_SELECTORS: &[(&str, &str)] = &[("script[src]", "src"), ("a[href]", "href")];

/// Counts tracker references in a candidate's HTML
#[derive(Debug, Clone)]
pub struct TrackerDetector {
    blacklist: Arc<TrackerBlacklist>,
}

impl TrackerDetector {
    pub fn new(blacklist: Arc<TrackerBlacklist>) -> Self {
        Self { blacklist }
    }

    /// Number of script sources and anchor targets pointing at blacklisted hosts
    pub fn tracker_count(&self, candidate: &CandidateResult) -> usize {
        self.count_in_html(&candidate.html)
    }

    /// Same as [`tracker_count`](Self::tracker_count) for raw HTML
    pub fn count_in_html(&self, html: &str) -> usize {
        if html.trim().is_empty() || self.blacklist.is_empty() {
            return 0;
        }

        outbound_references(html)
            .iter()
            .filter_map(|reference| reference_host(reference))
            .filter(|host| self.blacklist.contains(host))
            .count()
    }
}

/// Collect every script `src` and anchor `href` in document order per selector
pub fn outbound_references(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut references = Vec::new();

    for (selector_str, attr) in REFERENCE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            references.extend(
                document
                    .select(&selector)
                    .filter_map(|element| element.value().attr(attr))
                    .map(|value| value.to_string()),
            );
        }
    }

    references
}

/// Extract the hostname a reference points at
///
/// Absolute URLs are parsed as-is. Protocol-relative (`//host/x`) and
/// scheme-less references starting with a dotted host (`host.com/x`) are
/// read as `http://`. Paths, fragments and queries have no hostname.
pub fn reference_host(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    match Url::parse(reference) {
        Ok(url) => url.host_str().map(|h| h.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if let Some(rest) = reference.strip_prefix("//") {
                return host_of(&format!("http://{}", rest));
            }
            if reference.starts_with(|c: char| matches!(c, '/' | '.' | '#' | '?')) {
                return None;
            }

            let leading = reference
                .split(|c: char| matches!(c, '/' | '?' | '#'))
                .next()?;
            if !leading.contains('.') {
                return None;
            }
            host_of(&format!("http://{}", reference))
        }
        Err(_) => None,
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|h| h.to_string())
}
