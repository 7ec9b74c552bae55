use common::{ForecastError, Result};

/// Reject training windows a fitter cannot learn from.
///
/// Every fitter rejects empty and all-zero windows; `reject_constant` also
/// rejects zero-variance windows.
pub(crate) fn check_window(
    model: &str,
    values: &[f64],
    min_len: usize,
    reject_constant: bool,
) -> Result<()> {
    if values.len() < min_len.max(1) {
        return Err(ForecastError::Fit(format!(
            "{model} requires at least {} data points, got {}",
            min_len.max(1),
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Fit(format!("{model}: non-finite training value")));
    }
    if values.iter().all(|v| *v == 0.0) {
        return Err(ForecastError::Fit(format!(
            "{model}: degenerate series (all zero)"
        )));
    }
    if reject_constant {
        let first = values[0];
        if values.iter().all(|v| (v - first).abs() < 1e-12) {
            return Err(ForecastError::Fit(format!(
                "{model}: degenerate series (zero variance)"
            )));
        }
    }
    Ok(())
}
