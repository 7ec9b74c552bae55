use common::{FittedModel, ForecastModel, Result};

use crate::{Log1pScaler, Scaler};

/// A fitted model whose predictions are returned on the natural demand scale.
///
/// When the model was fit on transformed values, predictions pass through the
/// scaler's inverse before leaving. Negative predictions are clamped to zero.
pub struct ScaledModel {
    inner: Box<dyn FittedModel>,
    scaler: Option<Box<dyn Scaler>>,
}

impl ScaledModel {
    pub fn new(inner: Box<dyn FittedModel>, scaler: Option<Box<dyn Scaler>>) -> Self {
        Self { inner, scaler }
    }

    pub fn is_transformed(&self) -> bool {
        self.scaler.is_some()
    }
}

impl FittedModel for ScaledModel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn num_params(&self) -> usize {
        self.inner.num_params()
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let raw = self.inner.predict(horizon)?;
        let natural = match &self.scaler {
            Some(scaler) => scaler.inverse_transform(&raw)?,
            None => raw,
        };
        Ok(natural.into_iter().map(|v| v.max(0.0)).collect())
    }
}

/// Fit `model` on `values`, optionally in log space.
pub fn fit_scaled(
    model: &dyn ForecastModel,
    values: &[f64],
    log_transform: bool,
) -> Result<ScaledModel> {
    if !log_transform {
        return Ok(ScaledModel::new(model.fit(values)?, None));
    }

    let mut scaler = Log1pScaler::new();
    let transformed = scaler.fit_transform(values)?;
    let fitted = model.fit(&transformed)?;
    Ok(ScaledModel::new(fitted, Some(Box::new(scaler))))
}
