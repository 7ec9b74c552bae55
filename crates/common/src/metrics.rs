//! Point-forecast accuracy measures on the natural scale.
//!
//! All functions take `forecast` and `actual` of equal length.

/// Compute Root Mean Squared Error.
pub fn rmse(forecast: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    (forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (a - f).powi(2))
        .sum::<f64>()
        / forecast.len() as f64)
        .sqrt()
}

/// Compute Mean Absolute Error.
pub fn mae(forecast: &[f64], actual: &[f64]) -> f64 {
    assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs())
        .sum::<f64>()
        / forecast.len() as f64
}

/// Compute Mean Absolute Percentage Error, in percent.
///
/// Undefined (`None`) when any actual value is zero or the input is empty.
pub fn mape(forecast: &[f64], actual: &[f64]) -> Option<f64> {
    assert_eq!(forecast.len(), actual.len());
    if actual.is_empty() || actual.iter().any(|a| *a == 0.0) {
        return None;
    }
    let sum: f64 = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| ((a - f) / a).abs())
        .sum();
    Some(sum / actual.len() as f64 * 100.0)
}
