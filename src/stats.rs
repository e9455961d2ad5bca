//! Statistical operations on sampled measurement series.
//!
//! Two operations back the web layer: fitting a normal distribution to a
//! single series for histogram overlays, and z-score standardization of a
//! pair of series followed by an ordinary least-squares fit, the visual
//! proxy for Pearson correlation.

use crate::error::PanelError;

/// Number of points sampled along the fitted probability density curve.
pub const CURVE_POINTS: usize = 100;

/// A normal distribution fitted to one measurement series.
#[derive(Clone, Debug)]
pub struct NormalFit {
    /// Sample mean
    pub mean: f64,

    /// Sample standard deviation (n-1 denominator)
    pub std_dev: f64,

    /// Probability density sampled at [CURVE_POINTS] positions across the
    /// observed value range, for overlay plotting.
    pub curve: Vec<(f64, f64)>,
}

/// A standardized pair of measurement series with a least-squares fit.
#[derive(Clone, Debug)]
pub struct PairFit {
    /// First series, z-scored
    pub z_x: Vec<f64>,

    /// Second series, z-scored
    pub z_y: Vec<f64>,

    /// Slope of the least-squares fit of `z_y` on `z_x`. For standardized
    /// series this equals the Pearson correlation coefficient.
    pub slope: f64,

    /// Intercept of the least-squares fit
    pub intercept: f64,

    /// Endpoints of the fitted segment across the observed `z_x` range
    pub line: [(f64, f64); 2],
}

/// Fit a normal distribution to a series.
///
/// Returns the sample mean and standard deviation together with the density
/// curve sampled across `[min, max]` of the input.
///
/// # Arguments
///
/// * `values`: The series to fit. Must be non-empty with non-zero variance.
pub fn fit_normal(values: &[f64]) -> Result<NormalFit, PanelError> {
    let (mean, std_dev) = sample_moments(values, "normal fit")?;
    let (min, max) = value_range(values);
    let step = (max - min) / (CURVE_POINTS - 1) as f64;
    let curve = (0..CURVE_POINTS)
        .map(|i| {
            let x = min + step * i as f64;
            (x, normal_pdf(x, mean, std_dev))
        })
        .collect();
    Ok(NormalFit {
        mean,
        std_dev,
        curve,
    })
}

/// Standardize two paired series and fit a least-squares line.
///
/// Each series is independently rescaled to zero mean and unit variance
/// before the fit, so the slope reflects correlation rather than the scale
/// of either measurement.
///
/// # Arguments
///
/// * `x`: First series
/// * `y`: Second series, paired with `x` by index
pub fn standardize_and_fit(x: &[f64], y: &[f64]) -> Result<PairFit, PanelError> {
    if x.len() != y.len() {
        return Err(PanelError::MismatchedSeries {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    let z_x = standardize(x)?;
    let z_y = standardize(y)?;

    let (slope, intercept) = least_squares(&z_x, &z_y);
    let (min, max) = value_range(&z_x);
    let line = [
        (min, slope * min + intercept),
        (max, slope * max + intercept),
    ];

    Ok(PairFit {
        z_x,
        z_y,
        slope,
        intercept,
        line,
    })
}

/// Z-score a series using the sample standard deviation.
fn standardize(values: &[f64]) -> Result<Vec<f64>, PanelError> {
    let (mean, std_dev) = sample_moments(values, "standardization")?;
    Ok(values.iter().map(|v| (v - mean) / std_dev).collect())
}

/// Compute the sample mean and standard deviation of a series.
///
/// Fails on empty, constant or non-finite input rather than letting a zero
/// or NaN standard deviation propagate into a division downstream.
fn sample_moments(values: &[f64], operation: &'static str) -> Result<(f64, f64), PanelError> {
    if values.is_empty() {
        return Err(PanelError::EmptySample { operation });
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    // Sample variance, matching the n-1 denominator of the fitted overlay.
    // A single observation has no variance and falls through the zero check.
    let variance = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    let std_dev = variance.sqrt();
    if !std_dev.is_finite() || std_dev == 0.0 {
        return Err(PanelError::DegenerateSample { operation });
    }
    Ok((mean, std_dev))
}

/// Ordinary least-squares fit of `y` on `x`.
///
/// Callers guarantee non-degenerate input: both series have been
/// standardized, so `x` has unit variance.
fn least_squares(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        covariance += (xi - mean_x) * (yi - mean_y);
        variance += (xi - mean_x).powi(2);
    }
    let slope = covariance / variance;
    let intercept = mean_y - slope * mean_x;
    (slope, intercept)
}

/// Normal probability density function.
fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * std::f64::consts::PI).sqrt())
}

/// Returns the minimum and maximum of a non-empty series.
fn value_range(values: &[f64]) -> (f64, f64) {
    values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), &v| (min.min(v), max.max(v)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn sample_series() -> Vec<f64> {
        // Deterministic, non-trivial spread.
        (0..100).map(|i| (i as f64 * 0.37).sin() * 4.0 + 20.0).collect()
    }

    #[test]
    fn fit_normal_moments() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let fit = fit_normal(&values).unwrap();
        assert!((fit.mean - 5.0).abs() < TOLERANCE);
        // Sample standard deviation with n-1 denominator.
        assert!((fit.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn fit_normal_curve_spans_observed_range() {
        let values = sample_series();
        let fit = fit_normal(&values).unwrap();
        assert_eq!(CURVE_POINTS, fit.curve.len());
        let (min, max) = value_range(&values);
        assert!((fit.curve[0].0 - min).abs() < TOLERANCE);
        assert!((fit.curve[CURVE_POINTS - 1].0 - max).abs() < TOLERANCE);
        // Density is positive and peaks near the mean.
        let peak = fit
            .curve
            .iter()
            .cloned()
            .fold((0.0, 0.0), |acc, p| if p.1 > acc.1 { p } else { acc });
        assert!((peak.0 - fit.mean).abs() < fit.std_dev);
        assert!(fit.curve.iter().all(|&(_, d)| d > 0.0));
    }

    #[test]
    fn fit_normal_empty_fails() {
        let result = fit_normal(&[]);
        assert!(matches!(
            result,
            Err(PanelError::EmptySample { operation: "normal fit" })
        ));
    }

    #[test]
    fn fit_normal_zero_variance_fails() {
        let values = vec![3.5; 40];
        let result = fit_normal(&values);
        assert!(matches!(
            result,
            Err(PanelError::DegenerateSample { operation: "normal fit" })
        ));
    }

    #[test]
    fn fit_normal_single_value_fails() {
        let result = fit_normal(&[1.0]);
        assert!(matches!(result, Err(PanelError::DegenerateSample { .. })));
    }

    #[test]
    fn fit_normal_non_finite_fails() {
        let result = fit_normal(&[1.0, f64::NAN, 3.0]);
        assert!(matches!(result, Err(PanelError::DegenerateSample { .. })));
    }

    #[test]
    fn standardized_series_has_zero_mean_unit_variance() {
        let x = sample_series();
        let y: Vec<f64> = x.iter().map(|v| v * -2.0 + 3.0).collect();
        let fit = standardize_and_fit(&x, &y).unwrap();
        for z in [&fit.z_x, &fit.z_y] {
            let n = z.len() as f64;
            let mean = z.iter().sum::<f64>() / n;
            let variance = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            assert!(mean.abs() < TOLERANCE);
            assert!((variance - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn perfectly_correlated_pair_has_unit_slope() {
        let x = sample_series();
        let y: Vec<f64> = x.iter().map(|v| v * 3.0 + 1.0).collect();
        let fit = standardize_and_fit(&x, &y).unwrap();
        assert!((fit.slope - 1.0).abs() < TOLERANCE);
        assert!(fit.intercept.abs() < TOLERANCE);
    }

    #[test]
    fn affine_rescaling_is_invariant_up_to_slope_sign() {
        let x = sample_series();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| v + (i % 7) as f64).collect();
        let fit = standardize_and_fit(&x, &y).unwrap();

        // Positive rescaling of either input changes nothing.
        let x_scaled: Vec<f64> = x.iter().map(|v| v * 12.5 - 400.0).collect();
        let scaled = standardize_and_fit(&x_scaled, &y).unwrap();
        assert!((scaled.slope - fit.slope).abs() < TOLERANCE);
        for (a, b) in scaled.z_x.iter().zip(&fit.z_x) {
            assert!((a - b).abs() < TOLERANCE);
        }

        // A negative scale reflects the z-scores and flips the slope sign.
        let y_flipped: Vec<f64> = y.iter().map(|v| v * -0.5 + 2.0).collect();
        let flipped = standardize_and_fit(&x, &y_flipped).unwrap();
        assert!((flipped.slope + fit.slope).abs() < TOLERANCE);
    }

    #[test]
    fn fit_line_spans_standardized_range() {
        let x = sample_series();
        let y: Vec<f64> = x.iter().rev().copied().collect();
        let fit = standardize_and_fit(&x, &y).unwrap();
        let (min, max) = value_range(&fit.z_x);
        assert!((fit.line[0].0 - min).abs() < TOLERANCE);
        assert!((fit.line[1].0 - max).abs() < TOLERANCE);
        assert!((fit.line[0].1 - (fit.slope * min + fit.intercept)).abs() < TOLERANCE);
    }

    #[test]
    fn mismatched_series_fail() {
        let result = standardize_and_fit(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(PanelError::MismatchedSeries { x_len: 3, y_len: 2 })
        ));
    }

    #[test]
    fn degenerate_pair_fails() {
        let x = vec![1.0, 1.0, 1.0, 1.0];
        let y = vec![1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            standardize_and_fit(&x, &y),
            Err(PanelError::DegenerateSample { .. })
        ));
        assert!(matches!(
            standardize_and_fit(&y, &x),
            Err(PanelError::DegenerateSample { .. })
        ));
        assert!(matches!(
            standardize_and_fit(&[], &[]),
            Err(PanelError::EmptySample { .. })
        ));
    }
}
