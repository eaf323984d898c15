// Shared types for the scoring filter
use serde::{Deserialize, Serialize};

/// One retrieved page for a query, prior to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Ordering key, lower is better; mutated by the penalty passes
    #[serde(default)]
    pub rank: f64,
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    /// Raw page source, only needed for scoring
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub query: String,
}

impl CandidateResult {
    pub fn new(
        query: impl Into<String>,
        rank: f64,
        link: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            rank,
            link: link.into(),
            title: String::new(),
            snippet: String::new(),
            html: html.into(),
            query: query.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

/// Outcome of comparing one raw signal against the set's median
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    /// Within the normal range for this candidate set
    Normal,
    /// Outlier; the raw signal is replaced by the sentinel penalty
    Outlier,
}

/// Result of running one penalty pass over a candidate set
#[derive(Debug, Clone, Default)]
pub struct PenaltyPass {
    /// Median of the raw signal; `None` for an empty set
    pub median: Option<f64>,
    /// Classification per candidate, in input order
    pub classes: Vec<SignalClass>,
    /// Rank increment per candidate, in input order
    pub penalties: Vec<f64>,
}

impl PenaltyPass {
    /// Number of candidates classified as outliers
    pub fn outliers(&self) -> usize {
        self.classes
            .iter()
            .filter(|c| **c == SignalClass::Outlier)
            .count()
    }
}

/// Statistics from one filter run
#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    /// Number of candidates ranked
    pub candidates: usize,
    /// Median tracker count
    pub tracker_median: Option<f64>,
    /// Candidates given the tracker sentinel
    pub tracker_outliers: usize,
    /// Median word count
    pub content_median: Option<f64>,
    /// Candidates flagged as thin content
    pub thin_content: usize,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}
