// Small numeric helpers shared by the deriver and the chart builders.

/// Percentile with linear interpolation between closest ranks, the way numpy
/// computes it by default. Returns `None` for an empty input.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Window used for the trend line over `len` samples.
pub fn moving_average_window(len: usize, max_window: usize) -> usize {
    (len / 10).min(max_window)
}

/// Trailing rolling mean over `window` samples.
///
/// The output has the same length as the input. Positions before the first
/// complete window repeat the first complete average. A zero window is
/// treated as one.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let window = window.clamp(1, values.len());
    let mut averages = Vec::with_capacity(values.len());
    let mut sum: f64 = values[..window].iter().sum();
    let first = sum / window as f64;

    averages.resize(window, first);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        averages.push(sum / window as f64);
    }

    averages
}
