use std::time::Instant;

use analyzer::TimeSeriesAnalyzer;
use common::{
    ForecastConfig, ForecastError, ForecastModel, MetricRecord, ProductStatus, Result, Series,
    SelectionResult,
};
use rayon::prelude::*;
use scaler::fit_scaled;
use tracing::{debug, info, warn};

/// Everything one product's pipeline produced.
#[derive(Debug)]
pub struct ProductOutcome {
    pub product_id: String,
    pub status: ProductStatus,
    /// One record per candidate fitter attempted, in candidate order.
    pub metrics: Vec<MetricRecord>,
    pub selection: Option<SelectionResult>,
    /// The run deadline cut this product short.
    pub timed_out: bool,
}

/// Runs one product through split → fit → evaluate → select → refit.
///
/// Candidate fitters run concurrently on the current rayon pool. Failures stay
/// scoped: a failed fitter becomes a failed metric row, a failed product
/// becomes a terminal status.
pub struct ProductTrainer<'a> {
    config: &'a ForecastConfig,
    analyzer: TimeSeriesAnalyzer,
    deadline: Option<Instant>,
}

impl<'a> ProductTrainer<'a> {
    pub fn new(config: &'a ForecastConfig, deadline: Option<Instant>) -> Self {
        Self {
            config,
            analyzer: TimeSeriesAnalyzer::new(),
            deadline,
        }
    }

    /// Season length used by the seasonal fitters for this product.
    ///
    /// Configured value first, then FFT detection on the training window
    /// (when enabled), then the cadence default.
    pub fn season_length(&self, series: &Series, training: &[f64]) -> usize {
        if let Some(configured) = self.config.season_length {
            return configured;
        }
        if self.config.detect_seasonality {
            if let Some(period) = self.analyzer.season_length(training) {
                debug!(
                    product = series.product_id(),
                    period, "Detected seasonal period"
                );
                return period;
            }
        }
        series.frequency().default_season_length()
    }

    pub fn run(&self, series: &Series) -> ProductOutcome {
        let product_id = series.product_id().to_string();
        let start = Instant::now();

        let mut metrics = Vec::new();
        let result = self.train(series, &mut metrics);

        let timed_out = matches!(result, Err(ForecastError::Timeout(_)));
        let (status, selection) = match result {
            Ok(selection) => (
                ProductStatus::Forecasted {
                    model_name: selection.model_name.clone(),
                },
                Some(selection),
            ),
            Err(e) => {
                warn!(product = %product_id, error = %e, "Product pipeline failed");
                (ProductStatus::from_error(&e), None)
            }
        };

        info!(
            product = %product_id,
            status = status.label(),
            candidates = metrics.len(),
            time = format!("{:.2}s", start.elapsed().as_secs_f64()),
            "Product pipeline complete"
        );

        ProductOutcome {
            product_id,
            status,
            metrics,
            selection,
            timed_out,
        }
    }

    fn train(&self, series: &Series, metrics: &mut Vec<MetricRecord>) -> Result<SelectionResult> {
        let product_id = series.product_id();
        self.check_deadline(product_id)?;

        let split = store::split(series, self.config.holdout_length)?;
        let training = split.training.values();
        let holdout = split.holdout.values();

        let season_length = self.season_length(series, &training);
        let candidates = models::default_models(season_length, self.config.arima);

        debug!(
            product = product_id,
            training = training.len(),
            holdout = holdout.len(),
            season_length,
            "Fitting candidates"
        );

        *metrics = self.fit_candidates(product_id, &candidates, &training, &holdout);

        // Results finished after the deadline are discarded, not reported
        self.check_deadline(product_id)?;

        selector::select(
            product_id,
            metrics.as_slice(),
            &candidates,
            series,
            self.config.horizon_for(series.frequency()),
            self.config.log_transform_for_fitting,
        )
    }

    /// Fit and score every candidate; failures become failed records.
    fn fit_candidates(
        &self,
        product_id: &str,
        candidates: &[Box<dyn ForecastModel>],
        training: &[f64],
        holdout: &[f64],
    ) -> Vec<MetricRecord> {
        candidates
            .par_iter()
            .map(|model| {
                let outcome = self.check_deadline(product_id).and_then(|_| {
                    let fitted =
                        fit_scaled(model.as_ref(), training, self.config.log_transform_for_fitting)?;
                    evaluator::evaluate(product_id, &fitted, holdout)
                });
                match outcome {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(
                            product = product_id,
                            model = model.name(),
                            error = %e,
                            "Candidate ineligible"
                        );
                        MetricRecord::failed(product_id, model.name(), &e)
                    }
                }
            })
            .collect()
    }

    fn check_deadline(&self, product_id: &str) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ForecastError::Timeout(format!(
                "run deadline passed while processing {product_id}"
            ))),
            _ => Ok(()),
        }
    }
}
