// Scoring filter for search-result candidates
//
// Pass 1: Tracker penalty (outliers above the median tracker count sink)
// Pass 2: Content penalty (pages under half the median word count sink)
// Finalize: sort by rank ascending, round ranks

mod blacklist;
mod content;
mod penalty;
mod trackers;
mod types;
mod utils;

pub use blacklist::TrackerBlacklist;
pub use content::{visible_text, word_count, word_count_html};
pub use penalty::{ContentPenalty, TrackerPenalty};
pub use trackers::{outbound_references, reference_host, TrackerDetector};
pub use types::{CandidateResult, FilterStats, PenaltyPass, SignalClass};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Tunables for the scoring filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Multiplier applied to the effective tracker count
    pub tracker_weight: f64,
    /// Effective tracker count substituted for outliers
    pub tracker_penalty: f64,
    /// Penalty added to thin-content pages
    pub content_penalty: f64,
    /// Normalized word count at or below which a page is thin
    pub thin_content_ratio: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tracker_weight: 2.0,
            tracker_penalty: 20.0,
            content_penalty: 20.0,
            thin_content_ratio: 0.5,
        }
    }
}

/// Ranks one query's candidate set
///
/// Holds no per-query state, so a single instance can be shared across
/// threads and used for many queries concurrently.
#[derive(Debug, Clone)]
pub struct ScoringFilter {
    detector: TrackerDetector,
    trackers: TrackerPenalty,
    content: ContentPenalty,
}

impl ScoringFilter {
    /// Create a scoring filter
    ///
    /// # Arguments
    /// * `blacklist` - Tracker hostnames, loaded once at startup
    /// * `config` - Penalty weights and thresholds
    pub fn new(blacklist: Arc<TrackerBlacklist>, config: &FilterConfig) -> Self {
        Self {
            detector: TrackerDetector::new(blacklist),
            trackers: TrackerPenalty {
                weight: config.tracker_weight,
                sentinel: config.tracker_penalty,
            },
            content: ContentPenalty {
                sentinel: config.content_penalty,
                thin_ratio: config.thin_content_ratio,
            },
        }
    }

    /// Apply both penalty passes and return candidates sorted by rank
    pub fn filter(&self, candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
        self.filter_with_stats(candidates).0
    }

    /// Same as [`filter`](Self::filter), also reporting per-pass statistics
    ///
    /// No candidate is ever dropped; flagged pages only sink.
    pub fn filter_with_stats(
        &self,
        mut candidates: Vec<CandidateResult>,
    ) -> (Vec<CandidateResult>, FilterStats) {
        let start = Instant::now();

        let tracker_pass = self.tracker_pass(&candidates);
        apply(&mut candidates, &tracker_pass);

        let content_pass = self.content_pass(&candidates);
        apply(&mut candidates, &content_pass);

        // Stable sort keeps upstream order among equal ranks
        candidates.sort_by(|a, b| a.rank.total_cmp(&b.rank));
        // Halves round to even
        for candidate in &mut candidates {
            candidate.rank = candidate.rank.round_ties_even();
        }

        let stats = FilterStats {
            candidates: candidates.len(),
            tracker_median: tracker_pass.median,
            tracker_outliers: tracker_pass.outliers(),
            content_median: content_pass.median,
            thin_content: content_pass.outliers(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        tracing::debug!(
            candidates = stats.candidates,
            tracker_outliers = stats.tracker_outliers,
            thin_content = stats.thin_content,
            "Ranked candidate set"
        );

        (candidates, stats)
    }

    /// Tracker counts for the set, classified against their median
    pub fn tracker_pass(&self, candidates: &[CandidateResult]) -> PenaltyPass {
        let counts: Vec<usize> = candidates
            .iter()
            .map(|c| self.detector.tracker_count(c))
            .collect();
        self.trackers.evaluate(&counts)
    }

    /// Word counts for the set, classified against their median
    pub fn content_pass(&self, candidates: &[CandidateResult]) -> PenaltyPass {
        let counts: Vec<usize> = candidates.iter().map(word_count).collect();
        self.content.evaluate(&counts)
    }
}

fn apply(candidates: &mut [CandidateResult], pass: &PenaltyPass) {
    for (candidate, penalty) in candidates.iter_mut().zip(&pass.penalties) {
        candidate.rank += penalty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_filter() -> ScoringFilter {
        let blacklist = TrackerBlacklist::from_lines(["evil-tracker.com", "ads.example.net"]);
        ScoringFilter::new(Arc::new(blacklist), &FilterConfig::default())
    }

    fn page(words: usize) -> String {
        let body = vec!["word"; words].join(" ");
        format!("<html><body><p>{}</p></body></html>", body)
    }

    fn links(results: &[CandidateResult]) -> Vec<&str> {
        results.iter().map(|c| c.link.as_str()).collect()
    }

    #[test]
    fn test_tracker_page_sinks() {
        let filter = create_filter();
        let candidates = vec![
            CandidateResult::new("q", 0.0, "b", "<script src='evil-tracker.com/x'></script>"),
            CandidateResult::new("q", 0.0, "a", "<html></html>"),
        ];

        let (ranked, stats) = filter.filter_with_stats(candidates);

        assert_eq!(links(&ranked), vec!["a", "b"]);
        assert_eq!(ranked[0].rank, 0.0);
        assert_eq!(ranked[1].rank, 40.0);
        assert_eq!(stats.tracker_median, Some(0.5));
        assert_eq!(stats.tracker_outliers, 1);
    }

    #[test]
    fn test_thin_page_sinks() {
        let filter = create_filter();
        let candidates = vec![
            CandidateResult::new("q", 1.0, "thin", page(10)),
            CandidateResult::new("q", 2.0, "rich", page(100)),
        ];

        let (ranked, stats) = filter.filter_with_stats(candidates);

        assert_eq!(links(&ranked), vec!["rich", "thin"]);
        assert_eq!(ranked[0].rank, 2.0);
        assert_eq!(ranked[1].rank, 21.0);
        assert_eq!(stats.content_median, Some(55.0));
        assert_eq!(stats.thin_content, 1);
    }

    #[test]
    fn test_singleton_rank_unchanged() {
        let filter = create_filter();
        let html = "<script src='https://evil-tracker.com/t.js'></script><p>hi</p>";
        let ranked = filter.filter(vec![CandidateResult::new("q", 3.4, "only", html)]);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 3.0);
    }

    #[test]
    fn test_empty_set() {
        let filter = create_filter();
        let (ranked, stats) = filter.filter_with_stats(vec![]);

        assert!(ranked.is_empty());
        assert_eq!(stats.candidates, 0);
        assert!(stats.tracker_median.is_none());
    }

    #[test]
    fn test_all_empty_pages_not_penalized() {
        let filter = create_filter();
        let candidates = vec![
            CandidateResult::new("q", 2.0, "x", ""),
            CandidateResult::new("q", 1.0, "y", "<html></html>"),
        ];

        let ranked = filter.filter(candidates);
        assert_eq!(links(&ranked), vec!["y", "x"]);
        assert_eq!(ranked[0].rank, 1.0);
        assert_eq!(ranked[1].rank, 2.0);
    }

    #[test]
    fn test_ranks_rounded() {
        let filter = create_filter();
        let candidates = vec![
            CandidateResult::new("q", 1.6, "a", page(20)),
            CandidateResult::new("q", 1.2, "b", page(20)),
        ];

        let ranked = filter.filter(candidates);
        assert_eq!(links(&ranked), vec!["b", "a"]);
        assert_eq!(ranked[0].rank, 1.0);
        assert_eq!(ranked[1].rank, 2.0);
    }

    #[test]
    fn test_half_ranks_round_to_even() {
        let filter = create_filter();
        let candidates = vec![
            CandidateResult::new("q", 2.5, "a", page(20)),
            CandidateResult::new("q", 3.5, "b", page(20)),
            CandidateResult::new("q", 0.5, "c", page(20)),
        ];

        let ranked = filter.filter(candidates);
        assert_eq!(links(&ranked), vec!["c", "a", "b"]);
        let ranks: Vec<f64> = ranked.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_both_penalties_stack() {
        let filter = create_filter();
        let tracker_and_thin = format!(
            "<a href='https://ads.example.net/c'>ad</a>{}",
            "<p>tiny</p>"
        );
        let candidates = vec![
            CandidateResult::new("q", 0.0, "bad", tracker_and_thin),
            CandidateResult::new("q", 1.0, "good1", page(50)),
            CandidateResult::new("q", 2.0, "good2", page(60)),
        ];

        let ranked = filter.filter(candidates);
        assert_eq!(links(&ranked), vec!["good1", "good2", "bad"]);
        assert_eq!(ranked[2].rank, 60.0);
    }

    #[test]
    fn test_penalties_independently_configurable() {
        let blacklist = TrackerBlacklist::from_lines(["evil-tracker.com"]);
        let config = FilterConfig {
            tracker_weight: 1.0,
            tracker_penalty: 5.0,
            content_penalty: 100.0,
            thin_content_ratio: 0.5,
        };
        let filter = ScoringFilter::new(Arc::new(blacklist), &config);

        let candidates = vec![
            CandidateResult::new(
                "q",
                0.0,
                "tracked",
                format!("<script src='//evil-tracker.com/t.js'></script>{}", page(40)),
            ),
            CandidateResult::new("q", 0.0, "thin", page(5)),
            CandidateResult::new("q", 0.0, "plain", page(40)),
        ];

        let ranked = filter.filter(candidates);
        assert_eq!(links(&ranked), vec!["plain", "tracked", "thin"]);
        assert_eq!(ranked[1].rank, 5.0);
        assert_eq!(ranked[2].rank, 100.0);
    }
}
