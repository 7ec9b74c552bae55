use crate::Scaler;
use common::{ForecastError, Result};

/// Log scaler: `ln(1 + y)` forward, `exp(x) - 1` inverse.
///
/// Defined for non-negative demand, including zero-demand periods.
#[derive(Debug, Clone, Default)]
pub struct Log1pScaler {
    fitted: bool,
}

impl Log1pScaler {
    pub fn new() -> Self {
        Self { fitted: false }
    }
}

impl Scaler for Log1pScaler {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Cannot fit scaler on empty values".into(),
            ));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ForecastError::InvalidInput(format!(
                "log1p scaling requires finite non-negative values, got {v}"
            )));
        }
        self.fitted = true;
        Ok(())
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::InvalidInput("Scaler not fitted".into()));
        }
        Ok(values.iter().map(|v| v.ln_1p()).collect())
    }

    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::InvalidInput("Scaler not fitted".into()));
        }
        Ok(values.iter().map(|v| v.exp_m1()).collect())
    }
}
