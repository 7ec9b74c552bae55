//! Auto-ARIMA: differencing order from a variance-ratio test, then a grid
//! search over (p, q) fitted by conditional sum of squares and ranked by AIC.

mod diff;

use common::{ArimaConfig, FittedModel, ForecastError, ForecastModel, ModelCategory, Result};
use tracing::debug;

use crate::guard::check_window;
use crate::optimizer::{nelder_mead, NelderMeadBounds};

use diff::{difference, integrate, suggest_differencing};

const MAX_ITER: usize = 1000;
const TOLERANCE: f64 = 1e-8;
const COEF_BOUND: f64 = 0.99;
/// Floor on residual variance so exact fits keep a finite AIC.
const MIN_VARIANCE: f64 = 1e-10;

/// ARIMA(p, d, q) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    /// AR + MA coefficients + intercept.
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }
}

/// Automatic ARIMA order search bounded by [`ArimaConfig`].
pub struct ArimaModel {
    config: ArimaConfig,
}

impl ArimaModel {
    pub fn new(config: ArimaConfig) -> Self {
        Self { config }
    }
}

impl ForecastModel for ArimaModel {
    fn name(&self) -> &str {
        "ARIMA"
    }

    fn category(&self) -> ModelCategory {
        ModelCategory::Autoregressive
    }

    fn fit(&self, values: &[f64]) -> Result<Box<dyn FittedModel>> {
        check_window(self.name(), values, 4, true)?;

        let d = suggest_differencing(values).min(self.config.max_d);
        let diffed = difference(values, d);

        debug!(
            d,
            data_length = values.len(),
            max_p = self.config.max_p,
            max_q = self.config.max_q,
            "ARIMA order search"
        );

        let mut best: Option<(f64, FittedArima)> = None;

        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                let order = ArimaOrder { p, d, q };
                // At least three residuals beyond the conditioning window
                if diffed.len() < p.max(q) + 3 {
                    continue;
                }
                let Some(fitted) = fit_order(values, &diffed, order) else {
                    continue;
                };
                debug!(p, d, q, aic = fitted.aic, "ARIMA candidate");
                if best.as_ref().map_or(true, |(aic, _)| fitted.aic < *aic) {
                    best = Some((fitted.aic, fitted));
                }
            }
        }

        let (aic, fitted) = best.ok_or_else(|| {
            ForecastError::Fit(format!(
                "no ARIMA order converged to a finite AIC on {} points",
                values.len()
            ))
        })?;

        debug!(
            p = fitted.order.p,
            d = fitted.order.d,
            q = fitted.order.q,
            aic,
            "ARIMA selected order"
        );

        Ok(Box::new(fitted))
    }
}

pub(crate) struct FittedArima {
    order: ArimaOrder,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    original: Vec<f64>,
    diffed: Vec<f64>,
    residuals: Vec<f64>,
    aic: f64,
}

/// One-step predictions over the differenced series; returns residuals.
fn residuals(diffed: &[f64], order: ArimaOrder, intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let n = diffed.len();
    let start = order.p.max(order.q);
    let mut residuals = vec![0.0; n];

    for t in start..n {
        let mut pred = intercept;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * (diffed[t - 1 - i] - intercept);
        }
        for (i, theta) in ma.iter().enumerate() {
            pred += theta * residuals[t - 1 - i];
        }
        residuals[t] = diffed[t] - pred;
    }
    residuals
}

fn css(diffed: &[f64], order: ArimaOrder, params: &[f64]) -> f64 {
    let start = order.p.max(order.q);
    let (intercept, ar, ma) = split_params(params, order);
    let sum: f64 = residuals(diffed, order, intercept, ar, ma)[start..]
        .iter()
        .map(|e| e * e)
        .sum();
    if sum.is_finite() {
        sum
    } else {
        f64::MAX
    }
}

fn split_params(params: &[f64], order: ArimaOrder) -> (f64, &[f64], &[f64]) {
    (
        params[0],
        &params[1..1 + order.p],
        &params[1 + order.p..1 + order.p + order.q],
    )
}

/// Fit a single order; `None` when the objective or AIC is not finite.
fn fit_order(original: &[f64], diffed: &[f64], order: ArimaOrder) -> Option<FittedArima> {
    let n = diffed.len();
    let mean = diffed.iter().sum::<f64>() / n as f64;

    let params = if order.p == 0 && order.q == 0 {
        vec![mean]
    } else {
        let (lo, hi) = diffed
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let span = 2.0 * (hi - lo) + 1.0;

        let mut initial = vec![mean];
        initial.extend((0..order.p).map(|i| 0.1 / (i + 1) as f64));
        initial.extend((0..order.q).map(|i| 0.1 / (i + 1) as f64));

        let mut lower = vec![mean - span];
        let mut upper = vec![mean + span];
        lower.extend(std::iter::repeat(-COEF_BOUND).take(order.p + order.q));
        upper.extend(std::iter::repeat(COEF_BOUND).take(order.p + order.q));

        let result = nelder_mead(
            |params| css(diffed, order, params),
            &initial,
            &NelderMeadBounds { lower, upper },
            MAX_ITER,
            TOLERANCE,
        );
        if !result.converged {
            debug!(
                p = order.p,
                q = order.q,
                iterations = result.iterations,
                "ARIMA optimizer hit its iteration budget"
            );
        }
        if !result.value.is_finite() || result.value == f64::MAX {
            return None;
        }
        result.point
    };

    let (intercept, ar, ma) = split_params(&params, order);
    let residuals = residuals(diffed, order, intercept, ar, ma);

    let start = order.p.max(order.q);
    let valid = &residuals[start..];
    let n_eff = valid.len() as f64;
    let variance = (valid.iter().map(|r| r * r).sum::<f64>() / n_eff).max(MIN_VARIANCE);
    let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());
    let aic = -2.0 * ll + 2.0 * order.num_params() as f64;
    if !aic.is_finite() {
        return None;
    }

    Some(FittedArima {
        order,
        intercept,
        ar: ar.to_vec(),
        ma: ma.to_vec(),
        original: original.to_vec(),
        diffed: diffed.to_vec(),
        residuals,
        aic,
    })
}

impl FittedModel for FittedArima {
    fn name(&self) -> &str {
        "ARIMA"
    }

    fn num_params(&self) -> usize {
        self.order.num_params()
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut extended = self.diffed.clone();
        let mut errors = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for (i, phi) in self.ar.iter().enumerate() {
                if t > i {
                    pred += phi * (extended[t - 1 - i] - self.intercept);
                }
            }
            for (i, theta) in self.ma.iter().enumerate() {
                if t > i {
                    pred += theta * errors[t - 1 - i];
                }
            }
            extended.push(pred);
            // Future shocks have zero expectation
            errors.push(0.0);
        }

        let forecast = integrate(&extended[self.diffed.len()..], &self.original, self.order.d);
        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Fit(
                "ARIMA produced a non-finite forecast".into(),
            ));
        }
        Ok(forecast)
    }
}
