use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{ForecastError, Result};

/// Calendar cadence of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    /// Seasonal period used when none is configured or detected.
    pub fn default_season_length(self) -> usize {
        match self {
            Frequency::Daily => 7,
            Frequency::Monthly => 12,
        }
    }

    /// Forecast length used when none is configured: 30 days or one month.
    pub fn default_horizon(self) -> usize {
        match self {
            Frequency::Daily => 30,
            Frequency::Monthly => 1,
        }
    }

    /// The date `steps` periods after `date`.
    pub fn advance(self, date: NaiveDate, steps: u32) -> Result<NaiveDate> {
        let next = match self {
            Frequency::Daily => date.checked_add_days(Days::new(u64::from(steps))),
            Frequency::Monthly => date.checked_add_months(Months::new(steps)),
        };
        next.ok_or_else(|| {
            ForecastError::InvalidInput(format!("date overflow advancing {date} by {steps}"))
        })
    }

    /// Infer cadence from the median gap between consecutive dates.
    ///
    /// Gaps of 28 days or more are monthly; anything shorter is daily.
    /// Fewer than two dates default to monthly.
    pub fn infer(dates: &[NaiveDate]) -> Self {
        if dates.len() < 2 {
            return Frequency::Monthly;
        }
        let mut gaps: Vec<i64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .collect();
        gaps.sort_unstable();
        if gaps[gaps.len() / 2] >= 28 {
            Frequency::Monthly
        } else {
            Frequency::Daily
        }
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

/// Last day of the month `steps` months after `date`'s month.
fn month_end_after(date: NaiveDate, steps: u32) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(steps + 1))?
        .pred_opt()
}

/// One period of recorded demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A cleaned demand series for one product.
///
/// Dates are strictly increasing and values are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    product_id: String,
    frequency: Frequency,
    observations: Vec<Observation>,
}

impl Series {
    /// Build a series, inferring its cadence from the dates.
    pub fn new(product_id: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        let dates: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
        let frequency = Frequency::infer(&dates);
        Self::with_frequency(product_id, frequency, observations)
    }

    pub fn with_frequency(
        product_id: impl Into<String>,
        frequency: Frequency,
        observations: Vec<Observation>,
    ) -> Result<Self> {
        let product_id = product_id.into();

        for (i, obs) in observations.iter().enumerate() {
            if !obs.value.is_finite() || obs.value < 0.0 {
                return Err(ForecastError::InvalidInput(format!(
                    "{product_id}: value at index {i} must be finite and non-negative, got {}",
                    obs.value
                )));
            }
        }
        if let Some(i) = observations
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
        {
            return Err(ForecastError::InvalidInput(format!(
                "{product_id}: dates must be strictly increasing (index {})",
                i + 1
            )));
        }

        Ok(Self {
            product_id,
            frequency,
            observations,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    pub fn total_demand(&self) -> f64 {
        self.observations.iter().map(|o| o.value).sum()
    }

    /// Dates of the `horizon` periods following the last observation.
    ///
    /// Every date is stepped from the last observation. Monthly series stamped
    /// at month end stay on month ends, so a history ending Feb 28 continues
    /// with Mar 31.
    pub fn forecast_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date().ok_or_else(|| {
            ForecastError::InsufficientData(format!("series {} is empty", self.product_id))
        })?;
        let steps = u32::try_from(horizon).map_err(|_| {
            ForecastError::InvalidInput(format!("forecast horizon {horizon} is too large"))
        })?;
        let month_ends = self.frequency == Frequency::Monthly
            && self.observations.iter().all(|o| is_month_end(o.date));

        (1..=steps)
            .map(|step| {
                if month_ends {
                    month_end_after(last, step).ok_or_else(|| {
                        ForecastError::InvalidInput(format!(
                            "date overflow advancing {last} by {step}"
                        ))
                    })
                } else {
                    self.frequency.advance(last, step)
                }
            })
            .collect()
    }
}

/// Complexity tier of a forecast model, ordered simplest first.
///
/// Used as the tie-break when two models score the same holdout RMSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCategory {
    /// No parameters (SeasonalNaive)
    Baseline,
    /// Smoothing-weight models (ETS, Holt-Winters)
    Smoothing,
    /// Order-searched autoregressive models (ARIMA)
    Autoregressive,
}

/// A forecasting strategy that can be fit on a training window.
///
/// Implementations hold only configuration; every `fit` call is independent.
pub trait ForecastModel: Send + Sync {
    /// Returns the model's name.
    fn name(&self) -> &str;

    /// Returns the model's complexity tier.
    fn category(&self) -> ModelCategory;

    /// Fit on the provided values.
    fn fit(&self, values: &[f64]) -> Result<Box<dyn FittedModel>>;
}

/// A trained model bound to one training window.
pub trait FittedModel: Send + Sync {
    /// Name of the strategy that produced this model.
    fn name(&self) -> &str;

    /// Number of estimated parameters.
    fn num_params(&self) -> usize;

    /// Point forecast for the `horizon` periods following the training window.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;
}

/// Holdout accuracy of one (product, model) attempt.
///
/// Failed attempts carry `error` and no metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub product_id: String,
    pub model_name: String,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    /// Percent; `None` when any holdout actual is zero.
    pub mape: Option<f64>,
    pub error: Option<String>,
}

impl MetricRecord {
    pub fn failed(product_id: &str, model_name: &str, error: &ForecastError) -> Self {
        Self {
            product_id: product_id.to_string(),
            model_name: model_name.to_string(),
            rmse: None,
            mae: None,
            mape: None,
            error: Some(format!("{}: {error}", error.kind())),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.error.is_none() && self.rmse.is_some_and(f64::is_finite)
    }
}

/// One future period of the final forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// The chosen model for a product and its forward forecast.
pub struct SelectionResult {
    pub product_id: String,
    pub model_name: String,
    /// Winning strategy refit on the full series.
    pub refit_model: Box<dyn FittedModel>,
    pub forecast: Vec<ForecastPoint>,
}

impl fmt::Debug for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionResult")
            .field("product_id", &self.product_id)
            .field("model_name", &self.model_name)
            .field("refit_params", &self.refit_model.num_params())
            .field("forecast", &self.forecast)
            .finish()
    }
}

/// Seasonality found by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityInfo {
    pub strength: String,
    pub period: Option<usize>,
    pub score: f64,
    pub dominant_frequency: Option<f64>,
}

impl Default for SeasonalityInfo {
    fn default() -> Self {
        Self {
            strength: "unknown".into(),
            period: None,
            score: 0.0,
            dominant_frequency: None,
        }
    }
}

/// Terminal state of one requested product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProductStatus {
    Forecasted { model_name: String },
    /// Too little history to evaluate.
    Excluded { reason: String },
    Failed { reason: String },
}

impl ProductStatus {
    /// Map a per-product error onto its terminal state.
    pub fn from_error(error: &ForecastError) -> Self {
        let reason = format!("{}: {error}", error.kind());
        match error {
            ForecastError::InsufficientData(_) => ProductStatus::Excluded { reason },
            _ => ProductStatus::Failed { reason },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Forecasted { .. } => "forecasted",
            ProductStatus::Excluded { .. } => "excluded",
            ProductStatus::Failed { .. } => "failed",
        }
    }

    pub fn is_forecasted(&self) -> bool {
        matches!(self, ProductStatus::Forecasted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(n: usize) -> Vec<NaiveDate> {
        let base = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        (0..n)
            .map(|i| base.checked_add_months(Months::new(i as u32)).unwrap())
            .collect()
    }

    #[test]
    fn test_infer_frequency() {
        assert_eq!(Frequency::infer(&monthly(6)), Frequency::Monthly);
        let base = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let daily: Vec<NaiveDate> = (0..10).map(|i| base + chrono::Duration::days(i)).collect();
        assert_eq!(Frequency::infer(&daily), Frequency::Daily);
        assert_eq!(Frequency::infer(&[base]), Frequency::Monthly);
    }

    #[test]
    fn test_advance_monthly_clamps_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let next = Frequency::Monthly.advance(jan31, 1).unwrap();
        assert_eq!(next, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        let daily = Frequency::Daily.advance(jan31, 2).unwrap();
        assert_eq!(daily, NaiveDate::from_ymd_opt(2023, 2, 2).unwrap());
    }

    fn series_on(dates: &[(i32, u32, u32)]) -> Series {
        let observations = dates
            .iter()
            .map(|&(y, m, d)| Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), 1.0))
            .collect();
        Series::new("P", observations).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end_history_stays_on_month_ends() {
        let series = series_on(&[(2023, 1, 31), (2023, 2, 28), (2023, 3, 31)]);
        assert_eq!(
            series.forecast_dates(3).unwrap(),
            vec![ymd(2023, 4, 30), ymd(2023, 5, 31), ymd(2023, 6, 30)]
        );

        let series = series_on(&[(2022, 12, 31), (2023, 1, 31), (2023, 2, 28)]);
        assert_eq!(
            series.forecast_dates(2).unwrap(),
            vec![ymd(2023, 3, 31), ymd(2023, 4, 30)]
        );
    }

    #[test]
    fn test_mid_month_history_keeps_its_day() {
        let series = series_on(&[(2023, 1, 28), (2023, 2, 28), (2023, 3, 28)]);
        assert_eq!(
            series.forecast_dates(2).unwrap(),
            vec![ymd(2023, 4, 28), ymd(2023, 5, 28)]
        );
    }

    #[test]
    fn test_daily_forecast_dates_are_consecutive() {
        let series = series_on(&[(2023, 2, 26), (2023, 2, 27), (2023, 2, 28)]);
        let dates = series.forecast_dates(30).unwrap();
        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], ymd(2023, 3, 1));
        assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
    }

    #[test]
    fn test_forecast_dates_reject_oversized_horizon() {
        let series = series_on(&[(2023, 1, 1), (2023, 2, 1)]);
        let err = series.forecast_dates(usize::MAX).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn test_default_horizon_by_cadence() {
        assert_eq!(Frequency::Daily.default_horizon(), 30);
        assert_eq!(Frequency::Monthly.default_horizon(), 1);
    }

    #[test]
    fn test_series_rejects_negative_values() {
        let dates = monthly(2);
        let obs = vec![Observation::new(dates[0], 1.0), Observation::new(dates[1], -3.0)];
        let err = Series::new("A", obs).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let dates = monthly(2);
        let obs = vec![Observation::new(dates[1], 1.0), Observation::new(dates[0], 2.0)];
        assert!(Series::new("A", obs).is_err());
    }

    #[test]
    fn test_series_accessors() {
        let dates = monthly(3);
        let obs: Vec<Observation> = dates
            .iter()
            .zip([0.0, 5.0, 7.5])
            .map(|(d, v)| Observation::new(*d, v))
            .collect();
        let series = Series::new("SKU-9", obs).unwrap();
        assert_eq!(series.product_id(), "SKU-9");
        assert_eq!(series.frequency(), Frequency::Monthly);
        assert_eq!(series.values(), vec![0.0, 5.0, 7.5]);
        assert_eq!(series.total_demand(), 12.5);
        assert_eq!(series.last_date(), Some(dates[2]));
    }

    #[test]
    fn test_model_category_ordering() {
        assert!(ModelCategory::Baseline < ModelCategory::Smoothing);
        assert!(ModelCategory::Smoothing < ModelCategory::Autoregressive);
    }

    #[test]
    fn test_failed_metric_record_is_ineligible() {
        let err = ForecastError::Fit("constant series".into());
        let record = MetricRecord::failed("A", "ARIMA", &err);
        assert!(!record.is_eligible());
        assert_eq!(
            record.error.as_deref(),
            Some("fit_error: fit error: constant series")
        );
    }

    #[test]
    fn test_product_status_from_error() {
        let excluded = ProductStatus::from_error(&ForecastError::InsufficientData("3 < 6".into()));
        assert_eq!(excluded.label(), "excluded");
        match excluded {
            ProductStatus::Excluded { reason } => assert!(reason.starts_with("insufficient_data")),
            other => panic!("unexpected {other:?}"),
        }

        let failed = ProductStatus::from_error(&ForecastError::NoEligibleModel("P".into()));
        assert_eq!(failed.label(), "failed");
        assert!(!failed.is_forecasted());
    }

    #[test]
    fn test_product_status_serializes_tagged() {
        let status = ProductStatus::Forecasted {
            model_name: "ETS".into(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "forecasted");
        assert_eq!(json["model_name"], "ETS");
    }
}
