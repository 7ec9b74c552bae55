/// Apply `d` rounds of first differencing.
pub(crate) fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Undo `d` rounds of differencing on a forecast continuing `original`.
pub(crate) fn integrate(forecast: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let mut cumsum = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .map(|step| {
                cumsum += step;
                cumsum
            })
            .collect();
    }
    result
}

/// Differencing order suggested by a variance-ratio test (0, 1 or 2).
///
/// A round of differencing is kept when it cuts the variance below 90%.
pub(crate) fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 3 {
        return 0;
    }

    let var_0 = variance(series);
    let diff_1 = difference(series, 1);
    let var_1 = variance(&diff_1);

    if var_0 > 0.0 && var_1 / var_0 < 0.9 {
        let diff_2 = difference(&diff_1, 1);
        if diff_2.len() >= 2 && var_1 > 0.0 {
            let var_2 = variance(&diff_2);
            if var_2 / var_1 < 0.9 && var_2 < var_0 {
                return 2;
            }
        }
        return 1;
    }

    0
}

fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (series.len() - 1) as f64
}
