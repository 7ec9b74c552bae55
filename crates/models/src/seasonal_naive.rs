use common::{FittedModel, ForecastModel, ModelCategory, Result};
use tracing::debug;

use crate::guard::check_window;

/// SeasonalNaive model: repeats the last seasonal cycle as forecast.
///
/// With less than one full cycle of history it forecasts the overall mean.
pub struct SeasonalNaiveModel {
    season_length: usize,
}

impl SeasonalNaiveModel {
    pub fn new(season_length: usize) -> Self {
        Self {
            season_length: season_length.max(1),
        }
    }
}

impl ForecastModel for SeasonalNaiveModel {
    fn name(&self) -> &str {
        "SeasonalNaive"
    }

    fn category(&self) -> ModelCategory {
        ModelCategory::Baseline
    }

    fn fit(&self, values: &[f64]) -> Result<Box<dyn FittedModel>> {
        check_window(self.name(), values, 1, false)?;

        let n = values.len();
        let period = self.season_length;

        let pattern = if n >= period {
            values[n - period..].to_vec()
        } else {
            let mean = values.iter().sum::<f64>() / n as f64;
            debug!(period, n, "Shorter than one cycle, forecasting the mean");
            vec![mean]
        };

        Ok(Box::new(FittedSeasonalNaive { pattern }))
    }
}

struct FittedSeasonalNaive {
    pattern: Vec<f64>,
}

impl FittedModel for FittedSeasonalNaive {
    fn name(&self) -> &str {
        "SeasonalNaive"
    }

    fn num_params(&self) -> usize {
        0
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok((0..horizon)
            .map(|i| self.pattern[i % self.pattern.len()])
            .collect())
    }
}
