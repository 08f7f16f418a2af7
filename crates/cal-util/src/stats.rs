//! Percentile and ETA math for the corpus driver.
//!
//! [`percentile`] implements the R-7 definition (linear interpolation between
//! adjacent order statistics), which is what spreadsheet software and NumPy's
//! default produce, so baseline numbers stay comparable across tooling.

use thiserror::Error;

/// Errors from the statistics helpers.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StatsError {
    /// The requested percentile is outside `[0, 100]`.
    #[error("percentile must be within [0, 100], got {0}")]
    PercentileOutOfRange(f64),
}

/// Compute the p-th percentile of `values` using R-7 interpolation.
///
/// Non-finite entries are filtered out before the computation. An empty
/// (post-filter) input yields `0.0`. A percentile outside `[0, 100]` is an
/// error.
///
/// # Examples
///
/// ```
/// use cal_util::percentile;
///
/// assert_eq!(percentile(&[10.0, 20.0], 50.0).unwrap(), 15.0);
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0).unwrap(), 3.0);
/// assert_eq!(percentile(&[], 99.0).unwrap(), 0.0);
/// assert!(percentile(&[1.0], 101.0).is_err());
/// ```
pub fn percentile(values: &[f64], p: f64) -> Result<f64, StatsError> {
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::PercentileOutOfRange(p));
    }

    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Ok(0.0);
    }
    finite.sort_by(f64::total_cmp);

    // R-7: rank = p/100 * (n - 1), interpolated between floor and ceil.
    let rank = p / 100.0 * (finite.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Ok(finite[lower]);
    }
    let fraction = rank - lower as f64;
    Ok(finite[lower] + (finite[upper] - finite[lower]) * fraction)
}

/// Seconds in one year; projections beyond this are treated as noise.
const MAX_ETA_SECONDS: f64 = 31_536_000.0;

/// Estimate the remaining time for a corpus run, in whole seconds.
///
/// Returns `None` until at least 100 items have been processed (early rates
/// are unstable), whenever an input is non-finite or non-positive, and when
/// the projection falls outside `(0, 31_536_000]` seconds.
///
/// # Examples
///
/// ```
/// use cal_util::calculate_eta;
///
/// // 100 of 200 files in 10 seconds: 10 seconds remain.
/// assert_eq!(calculate_eta(100.0, 200.0, 10_000.0), Some(10));
/// assert_eq!(calculate_eta(99.0, 200.0, 10_000.0), None);
/// assert_eq!(calculate_eta(100.0, 100.0, 10_000.0), None);
/// ```
pub fn calculate_eta(processed: f64, total: f64, elapsed_ms: f64) -> Option<u64> {
    if !processed.is_finite() || !total.is_finite() || !elapsed_ms.is_finite() {
        return None;
    }
    if processed < 100.0 || total <= 0.0 || elapsed_ms <= 0.0 {
        return None;
    }

    let remaining = total - processed;
    let seconds = remaining / processed * elapsed_ms / 1000.0;
    if seconds <= 0.0 || seconds > MAX_ETA_SECONDS {
        return None;
    }
    Some(seconds.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        assert_eq!(percentile(&[10.0, 20.0], 50.0).unwrap(), 15.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0).unwrap(), 2.5);
    }

    #[test]
    fn test_percentile_endpoints_are_min_and_max() {
        let v = [7.0, 3.0, 9.0, 1.0];
        assert_eq!(percentile(&v, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&v, 100.0).unwrap(), 9.0);
    }

    #[test]
    fn test_percentile_median_odd() {
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0).unwrap(), 3.0);
    }

    #[test]
    fn test_percentile_filters_non_finite() {
        let v = [f64::NAN, 10.0, f64::INFINITY, 20.0, f64::NEG_INFINITY];
        assert_eq!(percentile(&v, 50.0).unwrap(), 15.0);
    }

    #[test]
    fn test_percentile_empty_returns_zero() {
        assert_eq!(percentile(&[], 50.0).unwrap(), 0.0);
        assert_eq!(percentile(&[f64::NAN], 50.0).unwrap(), 0.0);
    }

    #[test]
    fn test_percentile_out_of_range_is_error() {
        assert_eq!(
            percentile(&[1.0], -0.1),
            Err(StatsError::PercentileOutOfRange(-0.1))
        );
        assert!(percentile(&[1.0], 100.1).is_err());
        assert!(percentile(&[1.0], f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_outlier_scenario() {
        // 99 identical timings and one slow file: p95 stays at the common
        // value, so the slow file sits strictly above twice the p95.
        let mut v = vec![10.0; 99];
        v.push(500.0);
        let p95 = percentile(&v, 95.0).unwrap();
        assert_eq!(p95, 10.0);
        assert!(500.0 > 2.0 * p95);
    }

    #[test]
    fn test_eta_basic_projection() {
        assert_eq!(calculate_eta(100.0, 200.0, 10_000.0), Some(10));
        assert_eq!(calculate_eta(150.0, 300.0, 30_000.0), Some(30));
    }

    #[test]
    fn test_eta_requires_minimum_sample() {
        assert_eq!(calculate_eta(99.0, 1000.0, 5_000.0), None);
        assert_eq!(calculate_eta(0.0, 1000.0, 5_000.0), None);
    }

    #[test]
    fn test_eta_rejects_bad_inputs() {
        assert_eq!(calculate_eta(f64::NAN, 200.0, 1_000.0), None);
        assert_eq!(calculate_eta(100.0, f64::INFINITY, 1_000.0), None);
        assert_eq!(calculate_eta(100.0, 200.0, -1.0), None);
        assert_eq!(calculate_eta(100.0, -5.0, 1_000.0), None);
        assert_eq!(calculate_eta(100.0, 200.0, 0.0), None);
    }

    #[test]
    fn test_eta_rejects_finished_or_absurd_projections() {
        // Nothing remaining.
        assert_eq!(calculate_eta(200.0, 200.0, 10_000.0), None);
        // Projection beyond a year.
        assert_eq!(calculate_eta(100.0, 1_000_000_000.0, 3_600_000.0), None);
    }

    #[test]
    fn test_eta_rounds_to_whole_seconds() {
        // 100 processed in 1500 ms, 50 remaining -> 0.75 s -> 1.
        assert_eq!(calculate_eta(100.0, 150.0, 1_500.0), Some(1));
    }
}
