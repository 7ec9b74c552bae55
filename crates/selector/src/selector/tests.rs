use super::*;
use chrono::NaiveDate;
use common::{FittedModel, Frequency, ModelCategory, Observation};

/// Forecasts a constant; fails to fit windows longer than `max_len`.
struct Constant {
    name: &'static str,
    category: ModelCategory,
    value: f64,
    max_len: usize,
}

impl Constant {
    fn boxed(name: &'static str, category: ModelCategory, value: f64) -> Box<dyn ForecastModel> {
        Box::new(Self {
            name,
            category,
            value,
            max_len: usize::MAX,
        })
    }
}

struct FittedConstant {
    name: &'static str,
    value: f64,
}

impl ForecastModel for Constant {
    fn name(&self) -> &str {
        self.name
    }

    fn category(&self) -> ModelCategory {
        self.category
    }

    fn fit(&self, values: &[f64]) -> Result<Box<dyn FittedModel>> {
        if values.len() > self.max_len {
            return Err(ForecastError::Fit("window too long".into()));
        }
        Ok(Box::new(FittedConstant {
            name: self.name,
            value: self.value,
        }))
    }
}

impl FittedModel for FittedConstant {
    fn name(&self) -> &str {
        self.name
    }

    fn num_params(&self) -> usize {
        1
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(vec![self.value; horizon])
    }
}

fn record(model: &str, rmse: f64) -> MetricRecord {
    MetricRecord {
        product_id: "P".into(),
        model_name: model.into(),
        rmse: Some(rmse),
        mae: Some(rmse),
        mape: None,
        error: None,
    }
}

fn monthly_series(n: usize) -> Series {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let obs = (0..n)
        .map(|i| {
            let date = Frequency::Monthly.advance(start, i as u32).unwrap();
            Observation::new(date, 10.0 + i as f64)
        })
        .collect();
    Series::with_frequency("P", Frequency::Monthly, obs).unwrap()
}

#[test]
fn test_lowest_rmse_wins() {
    let candidates = vec![
        Constant::boxed("SeasonalNaive", ModelCategory::Baseline, 1.0),
        Constant::boxed("ETS", ModelCategory::Smoothing, 2.0),
        Constant::boxed("ARIMA", ModelCategory::Autoregressive, 3.0),
    ];
    let metrics = vec![
        record("SeasonalNaive", 5.0),
        record("ETS", 1.5),
        record("ARIMA", 2.0),
    ];
    let result = select("P", &metrics, &candidates, &monthly_series(12), 2, false).unwrap();
    assert_eq!(result.model_name, "ETS");
    assert_eq!(result.forecast.len(), 2);
    assert!(result.forecast.iter().all(|p| p.value == 2.0));
}

#[test]
fn test_tie_prefers_simpler_model() {
    let candidates = vec![
        Constant::boxed("ARIMA", ModelCategory::Autoregressive, 3.0),
        Constant::boxed("ETS", ModelCategory::Smoothing, 2.0),
        Constant::boxed("SeasonalNaive", ModelCategory::Baseline, 1.0),
    ];
    let metrics = vec![
        record("ARIMA", 0.0),
        record("ETS", 0.0),
        record("SeasonalNaive", 0.0),
    ];
    let ranked = rank_candidates(&metrics, &candidates);
    let order: Vec<&str> = ranked.iter().map(|(r, _)| r.model_name.as_str()).collect();
    assert_eq!(order, vec!["SeasonalNaive", "ETS", "ARIMA"]);
}

#[test]
fn test_failed_records_are_ineligible() {
    let candidates = vec![
        Constant::boxed("SeasonalNaive", ModelCategory::Baseline, 1.0),
        Constant::boxed("ETS", ModelCategory::Smoothing, 2.0),
    ];
    let metrics = vec![
        MetricRecord::failed("P", "SeasonalNaive", &ForecastError::Fit("degenerate".into())),
        record("ETS", 9.0),
    ];
    let result = select("P", &metrics, &candidates, &monthly_series(6), 1, false).unwrap();
    assert_eq!(result.model_name, "ETS");
}

#[test]
fn test_no_eligible_model() {
    let candidates = vec![Constant::boxed("ETS", ModelCategory::Smoothing, 2.0)];
    let metrics = vec![MetricRecord::failed(
        "P",
        "ETS",
        &ForecastError::Fit("degenerate".into()),
    )];
    let result = select("P", &metrics, &candidates, &monthly_series(6), 1, false);
    assert!(matches!(result, Err(ForecastError::NoEligibleModel(_))));
}

#[test]
fn test_refit_failure_falls_back_to_next_candidate() {
    // Fits the 8-point training window but not the 12-point full series
    let fragile: Box<dyn ForecastModel> = Box::new(Constant {
        name: "ARIMA",
        category: ModelCategory::Autoregressive,
        value: 3.0,
        max_len: 8,
    });
    let candidates = vec![fragile, Constant::boxed("ETS", ModelCategory::Smoothing, 2.0)];
    let metrics = vec![record("ARIMA", 0.5), record("ETS", 1.0)];
    let result = select("P", &metrics, &candidates, &monthly_series(12), 1, false).unwrap();
    assert_eq!(result.model_name, "ETS");
}

#[test]
fn test_forecast_dates_follow_cadence() {
    let candidates = vec![Constant::boxed("ETS", ModelCategory::Smoothing, 2.0)];
    let metrics = vec![record("ETS", 1.0)];
    let series = monthly_series(12); // 2023-01-01 .. 2023-12-01
    let result = select("P", &metrics, &candidates, &series, 3, false).unwrap();
    let dates: Vec<NaiveDate> = result.forecast.iter().map(|p| p.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ]
    );
    assert_eq!(result.refit_model.name(), "ETS");
}

#[test]
fn test_month_end_series_forecasts_month_ends() {
    let candidates = vec![Constant::boxed("ETS", ModelCategory::Smoothing, 2.0)];
    let metrics = vec![record("ETS", 1.0)];
    let obs = [(2023, 1, 31), (2023, 2, 28), (2023, 3, 31)]
        .iter()
        .map(|&(y, m, d)| Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), 5.0))
        .collect();
    let series = Series::with_frequency("P", Frequency::Monthly, obs).unwrap();
    let result = select("P", &metrics, &candidates, &series, 2, false).unwrap();
    let dates: Vec<NaiveDate> = result.forecast.iter().map(|p| p.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2023, 4, 30).unwrap(),
            NaiveDate::from_ymd_opt(2023, 5, 31).unwrap(),
        ]
    );
}

#[test]
fn test_log_transform_refit_returns_natural_scale() {
    // Constant 0.0 in log space maps back to exp(0) - 1 = 0
    let candidates = vec![Constant::boxed("ETS", ModelCategory::Smoothing, 0.0)];
    let metrics = vec![record("ETS", 1.0)];
    let result = select("P", &metrics, &candidates, &monthly_series(6), 2, true).unwrap();
    assert!(result.forecast.iter().all(|p| p.value == 0.0));
}

#[test]
fn test_select_is_deterministic() {
    let candidates = vec![
        Constant::boxed("SeasonalNaive", ModelCategory::Baseline, 1.0),
        Constant::boxed("ETS", ModelCategory::Smoothing, 2.0),
    ];
    let metrics = vec![record("SeasonalNaive", 1.0), record("ETS", 1.0)];
    let series = monthly_series(12);
    let a = select("P", &metrics, &candidates, &series, 3, false).unwrap();
    let b = select("P", &metrics, &candidates, &series, 3, false).unwrap();
    assert_eq!(a.model_name, b.model_name);
    assert_eq!(a.forecast, b.forecast);
}
