// Statistics helpers for the penalty passes

/// Median of a set of values
/// Even-sized sets average the two middle values; empty sets have no median
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median of integer counts
pub fn median_count(counts: &[usize]) -> Option<f64> {
    let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    median(&values)
}
