mod log1p;
mod scaled;

pub use log1p::Log1pScaler;
pub use scaled::{fit_scaled, ScaledModel};

use common::Result;

/// A reversible transform applied to demand before fitting.
///
/// `fit` validates the training window; predictions made in transformed
/// space go back through `inverse_transform`.
pub trait Scaler: Send + Sync {
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>>;

    /// Map transformed values back to demand units.
    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>>;

    fn fit_transform(&mut self, values: &[f64]) -> Result<Vec<f64>> {
        self.fit(values)?;
        self.transform(values)
    }
}
