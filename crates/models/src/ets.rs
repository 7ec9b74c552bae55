use augurs::prelude::*;
use common::{FittedModel, ForecastError, ForecastModel, ModelCategory, Result};
use tracing::debug;

use crate::guard::check_window;
use crate::hw::{self, FittedHw};

/// Exponential smoothing model.
///
/// When `season_length > 1` and the window holds at least two full cycles,
/// uses the Holt-Winters implementation with additive and multiplicative
/// seasonality. Otherwise falls back to augurs AutoETS with the "ZZN"
/// (non-seasonal) spec.
pub struct EtsModel {
    season_length: Option<usize>,
}

impl EtsModel {
    pub fn new(season_length: Option<usize>) -> Self {
        Self { season_length }
    }
}

impl ForecastModel for EtsModel {
    fn name(&self) -> &str {
        "ETS"
    }

    fn category(&self) -> ModelCategory {
        ModelCategory::Smoothing
    }

    fn fit(&self, values: &[f64]) -> Result<Box<dyn FittedModel>> {
        check_window(self.name(), values, 3, true)?;

        if let Some(season_len) = self.season_length.filter(|&s| s > 1) {
            if values.len() >= 2 * season_len {
                debug!(
                    season_length = season_len,
                    data_length = values.len(),
                    "ETS fitting (Holt-Winters seasonal)"
                );
                let fitted = hw::hw_fit(values, season_len)?;
                return Ok(Box::new(FittedEts::HoltWinters(fitted)));
            }
        }

        let spec = "ZZN";
        debug!(
            requested_season_length = ?self.season_length,
            spec = spec,
            data_length = values.len(),
            "ETS fitting (non-seasonal)"
        );

        let auto = augurs::ets::AutoETS::new(1, spec)
            .map_err(|e| ForecastError::Fit(format!("ETS init: {e}")))?;
        let fitted = auto
            .fit(values)
            .map_err(|e| ForecastError::Fit(format!("ETS fit: {e}")))?;

        Ok(Box::new(FittedEts::Auto(Box::new(fitted))))
    }
}

enum FittedEts {
    HoltWinters(FittedHw),
    Auto(Box<augurs::ets::FittedAutoETS>),
}

impl FittedModel for FittedEts {
    fn name(&self) -> &str {
        "ETS"
    }

    fn num_params(&self) -> usize {
        match self {
            FittedEts::HoltWinters(hw) => hw.num_params(),
            // alpha and initial level; AutoETS may add trend terms
            FittedEts::Auto(_) => 2,
        }
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let point = match self {
            FittedEts::HoltWinters(hw) => hw.forecast(horizon),
            FittedEts::Auto(fitted) => {
                fitted
                    .predict(horizon, 0.80)
                    .map_err(|e| ForecastError::Fit(format!("ETS predict: {e}")))?
                    .point
            }
        };

        if point.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Fit("ETS produced a non-finite forecast".into()));
        }
        Ok(point)
    }
}
