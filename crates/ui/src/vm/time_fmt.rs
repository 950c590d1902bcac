use chrono::{DateTime, Utc};

/// Countdown / total-time label in M:SS form.
#[must_use]
pub fn format_mmss(total_secs: u32) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}:{seconds:02}")
}

/// Per-question duration with a single decimal, e.g. `4.2s`.
#[must_use]
pub fn format_secs(value: f64) -> String {
    format!("{value:.1}s")
}

#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Trailing moving average over the last `window` samples, one point per
/// input sample. Used for the pace trend on the results screen.
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            let start = idx.saturating_sub(window - 1);
            let slice = &values[start..=idx];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
