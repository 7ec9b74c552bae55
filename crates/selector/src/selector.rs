use common::{
    FittedModel, ForecastError, ForecastModel, ForecastPoint, MetricRecord, Result, Series,
    SelectionResult,
};
use scaler::fit_scaled;
use tracing::{debug, info, warn};

/// Order eligible candidates best first.
///
/// Lowest holdout RMSE wins; exact ties go to the simpler model (lower
/// [`common::ModelCategory`]), then to the model name. Records without a matching
/// candidate model are dropped.
pub fn rank_candidates<'a>(
    metrics: &'a [MetricRecord],
    candidates: &'a [Box<dyn ForecastModel>],
) -> Vec<(&'a MetricRecord, &'a dyn ForecastModel)> {
    let mut ranked: Vec<(&MetricRecord, &dyn ForecastModel)> = metrics
        .iter()
        .filter(|record| record.is_eligible())
        .filter_map(|record| {
            candidates
                .iter()
                .find(|model| model.name() == record.model_name)
                .map(|model| (record, model.as_ref()))
        })
        .collect();

    ranked.sort_by(|(ra, ma), (rb, mb)| {
        let rmse_a = ra.rmse.unwrap_or(f64::INFINITY);
        let rmse_b = rb.rmse.unwrap_or(f64::INFINITY);
        rmse_a
            .total_cmp(&rmse_b)
            .then_with(|| ma.category().cmp(&mb.category()))
            .then_with(|| ra.model_name.cmp(&rb.model_name))
    });
    ranked
}

/// Pick the winning model for one product and produce its forward forecast.
///
/// The winner is refit on the full series. If that refit fails (the longer
/// window can be degenerate for a fitter that handled the training window),
/// the next-ranked candidate is tried.
pub fn select(
    product_id: &str,
    metrics: &[MetricRecord],
    candidates: &[Box<dyn ForecastModel>],
    full_series: &Series,
    horizon: usize,
    log_transform: bool,
) -> Result<SelectionResult> {
    let ranked = rank_candidates(metrics, candidates);
    if ranked.is_empty() {
        return Err(ForecastError::NoEligibleModel(format!(
            "every fitter failed for product {product_id}"
        )));
    }

    let values = full_series.values();

    for (record, model) in &ranked {
        debug!(
            product = product_id,
            model = model.name(),
            rmse = format!("{:.4}", record.rmse.unwrap_or(f64::NAN)),
            "Refitting candidate on full series"
        );

        let refit = match fit_scaled(*model, &values, log_transform) {
            Ok(refit) => refit,
            Err(e) => {
                warn!(product = product_id, model = model.name(), error = %e, "Refit failed");
                continue;
            }
        };

        let predicted = match refit.predict(horizon) {
            Ok(predicted)
                if predicted.len() == horizon && predicted.iter().all(|v| v.is_finite()) =>
            {
                predicted
            }
            Ok(_) => {
                warn!(
                    product = product_id,
                    model = model.name(),
                    "Forecast has the wrong length or non-finite values"
                );
                continue;
            }
            Err(e) => {
                warn!(product = product_id, model = model.name(), error = %e, "Forecast failed");
                continue;
            }
        };

        let forecast = full_series
            .forecast_dates(horizon)?
            .into_iter()
            .zip(predicted)
            .map(|(date, value)| ForecastPoint { date, value })
            .collect();

        info!(
            product = product_id,
            model = model.name(),
            rmse = format!("{:.4}", record.rmse.unwrap_or(f64::NAN)),
            horizon,
            "Model selected"
        );

        return Ok(SelectionResult {
            product_id: product_id.to_string(),
            model_name: model.name().to_string(),
            refit_model: Box::new(refit),
            forecast,
        });
    }

    Err(ForecastError::NoEligibleModel(format!(
        "no eligible model could be refit on the full series for product {product_id}"
    )))
}

#[cfg(test)]
mod tests;
