use common::metrics::{mae, mape, rmse};
use common::{FittedModel, ForecastError, MetricRecord, Result};
use tracing::debug;

/// Score a trained model against the holdout window.
///
/// The model forecasts `holdout.len()` periods and is compared point by point.
/// A forecast of the wrong length or with non-finite values is a fit failure.
pub fn evaluate(
    product_id: &str,
    model: &dyn FittedModel,
    holdout: &[f64],
) -> Result<MetricRecord> {
    if holdout.is_empty() {
        return Err(ForecastError::InvalidInput(format!(
            "empty holdout for product {product_id}"
        )));
    }

    let forecast = model.predict(holdout.len())?;

    if forecast.len() != holdout.len() {
        return Err(ForecastError::Fit(format!(
            "{} returned {} values for a holdout of {}",
            model.name(),
            forecast.len(),
            holdout.len()
        )));
    }
    if forecast.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Fit(format!(
            "{} produced a non-finite holdout forecast",
            model.name()
        )));
    }

    let record = MetricRecord {
        product_id: product_id.to_string(),
        model_name: model.name().to_string(),
        rmse: Some(rmse(&forecast, holdout)),
        mae: Some(mae(&forecast, holdout)),
        mape: mape(&forecast, holdout),
        error: None,
    };

    debug!(
        product = product_id,
        model = model.name(),
        rmse = format!("{:.4}", record.rmse.unwrap_or(f64::NAN)),
        "Holdout evaluation"
    );

    Ok(record)
}
