use std::fmt::Write;

use chrono::NaiveDate;
use common::{MetricRecord, ProductStatus, Result};
use serde::{Deserialize, Serialize};
use trainer::ProductOutcome;

/// One future period of a product's chosen forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub product_id: String,
    pub model_name: String,
    pub date: NaiveDate,
    pub predicted_demand: f64,
}

/// Terminal state of one requested product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: String,
    #[serde(flatten)]
    pub status: ProductStatus,
}

/// Output artifact of a run: metrics and forecast tables plus one status per
/// requested product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// One row per (product, fitter) attempted, including failed attempts.
    pub metrics: Vec<MetricRecord>,
    pub forecasts: Vec<ForecastRow>,
    pub products: Vec<ProductRow>,
    /// The global deadline cut at least one product short.
    pub timed_out: bool,
}

impl ForecastReport {
    /// Aggregate per-product outcomes, sorted by product id.
    ///
    /// Metric rows keep candidate order within a product; forecast rows are
    /// ordered by date.
    pub fn from_outcomes(mut outcomes: Vec<ProductOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        let timed_out = outcomes.iter().any(|o| o.timed_out);
        let mut metrics = Vec::new();
        let mut forecasts = Vec::new();
        let mut products = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            metrics.extend(outcome.metrics);
            if let Some(selection) = outcome.selection {
                forecasts.extend(selection.forecast.iter().map(|point| ForecastRow {
                    product_id: selection.product_id.clone(),
                    model_name: selection.model_name.clone(),
                    date: point.date,
                    predicted_demand: point.value,
                }));
            }
            products.push(ProductRow {
                product_id: outcome.product_id,
                status: outcome.status,
            });
        }

        Self {
            metrics,
            forecasts,
            products,
            timed_out,
        }
    }

    pub fn status(&self, product_id: &str) -> Option<&ProductStatus> {
        self.products
            .iter()
            .find(|row| row.product_id == product_id)
            .map(|row| &row.status)
    }

    pub fn metrics_for(&self, product_id: &str) -> Vec<&MetricRecord> {
        self.metrics
            .iter()
            .filter(|m| m.product_id == product_id)
            .collect()
    }

    pub fn forecasts_for(&self, product_id: &str) -> Vec<&ForecastRow> {
        self.forecasts
            .iter()
            .filter(|f| f.product_id == product_id)
            .collect()
    }

    /// Number of products whose status label is `label`.
    pub fn count_with_status(&self, label: &str) -> usize {
        self.products
            .iter()
            .filter(|row| row.status.label() == label)
            .count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fixed-width text rendering of the three tables.
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{:<20} {:<15} {:>10} {:>10} {:>8}  {}",
            "Product", "Model", "RMSE", "MAE", "MAPE%", "Error"
        );
        let _ = writeln!(out, "{}", "-".repeat(80));
        for m in &self.metrics {
            let _ = writeln!(
                out,
                "{:<20} {:<15} {:>10} {:>10} {:>8}  {}",
                m.product_id,
                m.model_name,
                fmt_metric(m.rmse, 3),
                fmt_metric(m.mae, 3),
                fmt_metric(m.mape, 2),
                m.error.as_deref().unwrap_or(""),
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<20} {:<15} {:<12} {:>12}",
            "Product", "Model", "Date", "Demand"
        );
        let _ = writeln!(out, "{}", "-".repeat(62));
        for f in &self.forecasts {
            let _ = writeln!(
                out,
                "{:<20} {:<15} {:<12} {:>12.2}",
                f.product_id, f.model_name, f.date, f.predicted_demand
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{:<20} {:<12} {}", "Product", "Status", "Detail");
        let _ = writeln!(out, "{}", "-".repeat(62));
        for row in &self.products {
            let detail = match &row.status {
                ProductStatus::Forecasted { model_name } => model_name.as_str(),
                ProductStatus::Excluded { reason } | ProductStatus::Failed { reason } => {
                    reason.as_str()
                }
            };
            let _ = writeln!(
                out,
                "{:<20} {:<12} {}",
                row.product_id,
                row.status.label(),
                detail
            );
        }

        if self.timed_out {
            let _ = writeln!(out, "\nRun deadline exceeded.");
        }
        out
    }
}

fn fmt_metric(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "N/A".to_string(),
    }
}
