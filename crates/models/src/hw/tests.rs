use super::*;
use approx::assert_relative_eq;

fn make_seasonal_additive(n: usize, m: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 500.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / m as f64).sin())
        .collect()
}

fn make_seasonal_multiplicative(n: usize, m: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let ratio = 1.0 + 0.3 * (2.0 * std::f64::consts::PI * i as f64 / m as f64).sin();
            500.0 * ratio
        })
        .collect()
}

fn make_trend_seasonal(n: usize, m: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0 + 2.0 * i as f64 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / m as f64).sin()
        })
        .collect()
}

#[test]
fn test_initialize_additive_seasonal() {
    let m = 4;
    let values = vec![10.0, 20.0, 30.0, 40.0, 15.0, 25.0, 35.0, 45.0];
    let spec = HwSpec {
        trend: TrendType::Additive,
        seasonal: SeasonalType::Additive,
    };
    let state = HwState::initial(&values, m, spec);

    // Level = mean of first cycle = 25
    assert_relative_eq!(state.level, 25.0, epsilon = 1e-10);
    // Trend = ((15+25+35+45)/4 - 25) / 4 = 1.25
    assert_relative_eq!(state.trend, 1.25, epsilon = 1e-10);
    assert_relative_eq!(state.seasonal[0], -15.0, epsilon = 1e-10);
    assert_relative_eq!(state.seasonal[3], 15.0, epsilon = 1e-10);
}

#[test]
fn test_fit_additive_seasonal() {
    let m = 12;
    let values = make_seasonal_additive(120, m);
    let fitted = hw_fit(&values, m).unwrap();
    let mean = fitted.forecast(12);
    assert_eq!(mean.len(), 12);

    for (i, &v) in mean.iter().enumerate() {
        let expected =
            500.0 + 30.0 * (2.0 * std::f64::consts::PI * (120 + i) as f64 / m as f64).sin();
        assert!(
            (v - expected).abs() < 50.0,
            "h={}: forecast={:.1}, expected={:.1}",
            i,
            v,
            expected
        );
    }
}

#[test]
fn test_fit_multiplicative_seasonal() {
    let m = 12;
    let values = make_seasonal_multiplicative(120, m);
    let fitted = hw_fit(&values, m).unwrap();
    for v in fitted.forecast(12) {
        assert!(v > 200.0 && v < 800.0, "forecast out of range: {:.1}", v);
    }
}

#[test]
fn test_aicc_penalizes_complexity() {
    let simple = HwSpec {
        trend: TrendType::None,
        seasonal: SeasonalType::Additive,
    };
    let complex = HwSpec {
        trend: TrendType::AdditiveDamped,
        seasonal: SeasonalType::Additive,
    };

    let aicc_simple = compute_aicc(1000.0, 100, simple, 12);
    let aicc_complex = compute_aicc(1000.0, 100, complex, 12);
    assert!(
        aicc_complex > aicc_simple,
        "simple={:.2}, complex={:.2}",
        aicc_simple,
        aicc_complex
    );
}

#[test]
fn test_num_params() {
    let spec = HwSpec {
        trend: TrendType::AdditiveDamped,
        seasonal: SeasonalType::Multiplicative,
    };
    // alpha, beta, gamma, phi + level, trend, 4 seasonal
    assert_eq!(spec.num_params(4), 10);

    let flat = HwSpec {
        trend: TrendType::None,
        seasonal: SeasonalType::None,
    };
    assert_eq!(flat.num_params(12), 2);
}

#[test]
fn test_forecast_seasonal_shape() {
    let m = 4;
    let values = make_seasonal_additive(40, m);
    let mean = hw_fit(&values, m).unwrap().forecast(8);

    for i in 0..4 {
        assert!(
            (mean[i] - mean[i + 4]).abs() < 20.0,
            "Cycles differ at {}: {:.1} vs {:.1}",
            i,
            mean[i],
            mean[i + 4]
        );
    }
}

#[test]
fn test_zero_demand_periods() {
    // Intermittent demand with zeros: multiplicative specs must not produce NaN
    let m = 4;
    let values: Vec<f64> = (0..40)
        .map(|i| if i % m == 0 { 0.0 } else { 20.0 + (i % m) as f64 })
        .collect();
    let mean = hw_fit(&values, m).unwrap().forecast(4);
    assert_eq!(mean.len(), 4);
    assert!(mean.iter().all(|v| v.is_finite()), "non-finite in {mean:?}");
}

#[test]
fn test_insufficient_data() {
    let values = vec![1.0; 20]; // Less than 2*12=24
    let result = hw_fit(&values, 12);
    assert!(matches!(result, Err(ForecastError::Fit(_))));
}

#[test]
fn test_trend_plus_seasonal() {
    let m = 12;
    let values = make_trend_seasonal(120, m);
    let mean = hw_fit(&values, m).unwrap().forecast(12);

    let last_train = values.last().copied().unwrap();
    let forecast_mean: f64 = mean.iter().sum::<f64>() / mean.len() as f64;
    assert!(
        forecast_mean > last_train - 50.0,
        "Forecast mean ({:.1}) should be near or above last training value ({:.1})",
        forecast_mean,
        last_train
    );
}

#[test]
fn test_weights_decode_layout() {
    let spec = HwSpec {
        trend: TrendType::AdditiveDamped,
        seasonal: SeasonalType::None,
    };
    let w = HwWeights::decode(&[0.4, 0.1, 0.9], spec);
    assert_relative_eq!(w.alpha, 0.4);
    assert_relative_eq!(w.beta, 0.1);
    assert_relative_eq!(w.gamma, 0.0);
    assert_relative_eq!(w.phi, 0.9);
    // 0.9 + 0.81
    assert_relative_eq!(w.damped_sum(2), 1.71, epsilon = 1e-12);
}

#[test]
fn test_candidate_specs_cover_grid() {
    assert_eq!(candidate_specs().len(), 9);
}
