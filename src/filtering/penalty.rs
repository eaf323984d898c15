// Penalty passes: raw signal -> median classification -> rank increment
//
// Each pass is a pure function of the raw signals for one candidate set,
// so it can be evaluated and tested without touching the candidates.
use crate::filtering::types::{PenaltyPass, SignalClass};
use crate::filtering::utils;

/// Tracker penalty: outliers have their count replaced by the sentinel and
/// pay `weight × sentinel`; counts at or below the median are not penalized
#[derive(Debug, Clone, Copy)]
pub struct TrackerPenalty {
    pub weight: f64,
    pub sentinel: f64,
}

impl TrackerPenalty {
    /// A count above the set's median is an outlier
    pub fn classify(count: usize, median: f64) -> SignalClass {
        if count as f64 > median {
            SignalClass::Outlier
        } else {
            SignalClass::Normal
        }
    }

    /// Effective count after sentinel substitution; zero for normal pages
    pub fn effective_count(&self, class: SignalClass) -> f64 {
        match class {
            SignalClass::Outlier => self.sentinel,
            SignalClass::Normal => 0.0,
        }
    }

    pub fn evaluate(&self, counts: &[usize]) -> PenaltyPass {
        let Some(median) = utils::median_count(counts) else {
            return PenaltyPass::default();
        };

        let classes: Vec<SignalClass> = counts
            .iter()
            .map(|&count| Self::classify(count, median))
            .collect();

        let penalties = classes
            .iter()
            .map(|&class| self.weight * self.effective_count(class))
            .collect();

        PenaltyPass {
            median: Some(median),
            classes,
            penalties,
        }
    }
}

/// Thin-content penalty: binary, sentinel or nothing
#[derive(Debug, Clone, Copy)]
pub struct ContentPenalty {
    pub sentinel: f64,
    /// Pages at or below this fraction of the median word count are thin
    pub thin_ratio: f64,
}

impl ContentPenalty {
    /// Normalized word count against the median; `None` when the median is zero
    pub fn normalize(count: usize, median: f64) -> Option<f64> {
        if median > 0.0 {
            Some(count as f64 / median)
        } else {
            None
        }
    }

    pub fn classify(&self, count: usize, median: f64) -> SignalClass {
        match Self::normalize(count, median) {
            Some(ratio) if ratio <= self.thin_ratio => SignalClass::Outlier,
            _ => SignalClass::Normal,
        }
    }

    pub fn evaluate(&self, counts: &[usize]) -> PenaltyPass {
        let Some(median) = utils::median_count(counts) else {
            return PenaltyPass::default();
        };

        // A zero median disables the pass for this set
        let classes: Vec<SignalClass> = counts
            .iter()
            .map(|&count| self.classify(count, median))
            .collect();

        let penalties = classes
            .iter()
            .map(|class| match class {
                SignalClass::Outlier => self.sentinel,
                SignalClass::Normal => 0.0,
            })
            .collect();

        PenaltyPass {
            median: Some(median),
            classes,
            penalties,
        }
    }
}
