use std::time::{Duration, Instant};

use common::{ForecastConfig, ForecastError, Result};
use rayon::prelude::*;
use store::SeriesStore;
use tracing::{info, warn};
use trainer::{ProductOutcome, ProductTrainer};

use crate::report::ForecastReport;

/// Main forecasting entry point.
///
/// Pipeline per product: split → fit candidates → evaluate → select → refit.
/// Products run concurrently on a pool of `max_workers` threads; each
/// product's outcome is independent of every other product's.
///
/// Fails up front on an invalid configuration or an unknown requested
/// product. After that, failures are recorded per product in the report.
pub fn run(store: &SeriesStore, config: &ForecastConfig) -> Result<ForecastReport> {
    let start = Instant::now();
    config.validate()?;

    let products = store.resolve(&config.candidate_products)?;

    let deadline = config
        .time_budget_secs
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map(|budget| start + budget)
                .map_err(|e| ForecastError::Config(format!("time_budget_secs: {e}")))
        })
        .transpose()?;

    info!(
        products = products.len(),
        holdout = config.holdout_length,
        horizon = ?config.forecast_horizon,
        workers = config.max_workers,
        log_transform = config.log_transform_for_fitting,
        time_budget = ?config.time_budget_secs,
        "Starting forecast run"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_workers)
        .build()
        .map_err(|e| ForecastError::Config(format!("worker pool: {e}")))?;

    let trainer = ProductTrainer::new(config, deadline);
    let outcomes: Vec<ProductOutcome> = pool.install(|| {
        products
            .par_iter()
            .map(|product_id| store.get_series(product_id).map(|series| trainer.run(series)))
            .collect::<Result<Vec<_>>>()
    })?;

    let report = ForecastReport::from_outcomes(outcomes);

    if report.timed_out {
        warn!(
            budget = ?config.time_budget_secs,
            "Run deadline exceeded; completed products are still reported"
        );
    }

    info!(
        forecasted = report.count_with_status("forecasted"),
        excluded = report.count_with_status("excluded"),
        failed = report.count_with_status("failed"),
        time = format!("{:.2}s", start.elapsed().as_secs_f64()),
        "Forecast run complete"
    );

    Ok(report)
}
