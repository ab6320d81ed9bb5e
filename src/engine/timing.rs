use crate::error::{Result, SpanError};

/// Arithmetic mean. An empty sample is a contract violation.
pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(SpanError::EmptySample);
    }
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Population standard deviation.
pub fn sd(xs: &[f64]) -> Result<f64> {
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (m - x).powi(2)).sum();
    Ok((ss / xs.len() as f64).sqrt())
}

/// Differences between consecutive values; `n` values yield `n - 1` differences.
pub fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Adaptive verification timeout in milliseconds.
///
/// `onsets_ms` are the onset times of the practice items (plus the end of the
/// last one). The first `warm_up` onsets are dropped, the remaining intervals
/// give the mean trial duration, and `factor` standard deviations are added on
/// top.
pub fn adaptive_timeout_ms(onsets_ms: &[f64], warm_up: usize, factor: f64) -> Result<u64> {
    let measured = onsets_ms.get(warm_up..).unwrap_or(&[]);
    let intervals = diff(measured);
    let timeout = mean(&intervals)? + factor * sd(&intervals)?;
    Ok(timeout.max(0.0) as u64)
}
