use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ForecastError, Frequency, Result};

/// Application-level configuration, mirrors config/forecast.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl AppConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.forecast.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Which products a run should cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
    /// Pilot convenience: the `n` products with the highest total demand.
    TopByVolume(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of trailing periods held out for model comparison.
    #[serde(default = "default_holdout_length")]
    pub holdout_length: usize,

    /// Number of future periods to forecast. `None` means 30 days for daily
    /// series and one month for monthly series.
    #[serde(default)]
    pub forecast_horizon: Option<usize>,

    #[serde(default)]
    pub candidate_products: ProductSelection,

    /// Fit on `ln(1 + y)` and map predictions back before evaluation.
    #[serde(default)]
    pub log_transform_for_fitting: bool,

    /// Fixed seasonal period. `None` falls back to detection or the cadence default.
    #[serde(default)]
    pub season_length: Option<usize>,

    #[serde(default)]
    pub detect_seasonality: bool,

    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Global run deadline in seconds.
    #[serde(default)]
    pub time_budget_secs: Option<f64>,

    #[serde(default)]
    pub arima: ArimaConfig,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.holdout_length == 0 {
            return Err(ForecastError::Config("holdout_length must be >= 1".into()));
        }
        match self.forecast_horizon {
            Some(0) => {
                return Err(ForecastError::Config(
                    "forecast_horizon must be >= 1".into(),
                ))
            }
            Some(h) if u32::try_from(h).is_err() => {
                return Err(ForecastError::Config(format!(
                    "forecast_horizon must be <= {}, got {h}",
                    u32::MAX
                )))
            }
            _ => {}
        }
        if self.max_workers == 0 {
            return Err(ForecastError::Config("max_workers must be >= 1".into()));
        }
        if self.season_length == Some(0) {
            return Err(ForecastError::Config("season_length must be >= 1".into()));
        }
        if let Some(budget) = self.time_budget_secs {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(ForecastError::Config(format!(
                    "time_budget_secs must be positive, got {budget}"
                )));
            }
        }
        if let ProductSelection::TopByVolume(0) = self.candidate_products {
            return Err(ForecastError::Config(
                "top_by_volume must select at least one product".into(),
            ));
        }
        Ok(())
    }

    /// Forecast length for a series of the given cadence.
    pub fn horizon_for(&self, frequency: Frequency) -> usize {
        self.forecast_horizon
            .unwrap_or_else(|| frequency.default_horizon())
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            holdout_length: default_holdout_length(),
            forecast_horizon: None,
            candidate_products: ProductSelection::default(),
            log_transform_for_fitting: false,
            season_length: None,
            detect_seasonality: false,
            max_workers: default_max_workers(),
            time_budget_secs: None,
            arima: ArimaConfig::default(),
        }
    }
}

/// Bounds of the ARIMA order search grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArimaConfig {
    #[serde(default = "default_max_p")]
    pub max_p: usize,
    #[serde(default = "default_max_d")]
    pub max_d: usize,
    #[serde(default = "default_max_q")]
    pub max_q: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            max_p: default_max_p(),
            max_d: default_max_d(),
            max_q: default_max_q(),
        }
    }
}

fn default_holdout_length() -> usize {
    6
}
fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}
fn default_max_p() -> usize {
    2
}
fn default_max_d() -> usize {
    1
}
fn default_max_q() -> usize {
    2
}
