//! Holt-Winters exponential smoothing with additive/multiplicative seasonality.
//!
//! Provides the seasonal half of the ETS fitter; augurs AutoETS covers the
//! non-seasonal specs ("ZZN").

use common::{ForecastError, Result};
use tracing::debug;

use crate::optimizer::{nelder_mead, NelderMeadBounds};

const MAX_ITER: usize = 200;
const TOLERANCE: f64 = 1e-6;
/// Below this a multiplicative divisor is treated as zero.
const EPS: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrendType {
    None,
    Additive,
    AdditiveDamped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeasonalType {
    None,
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct HwSpec {
    pub trend: TrendType,
    pub seasonal: SeasonalType,
}

impl HwSpec {
    fn has_trend(&self) -> bool {
        self.trend != TrendType::None
    }

    fn has_season(&self) -> bool {
        self.seasonal != SeasonalType::None
    }

    fn is_damped(&self) -> bool {
        self.trend == TrendType::AdditiveDamped
    }

    /// Smoothing weights plus initial states (level, trend, m seasonal).
    pub fn num_params(&self, m: usize) -> usize {
        let weights = 1 + usize::from(self.has_trend())
            + usize::from(self.has_season())
            + usize::from(self.is_damped());
        let states = 1 + usize::from(self.has_trend()) + if self.has_season() { m } else { 0 };
        weights + states
    }

    /// Apply a seasonal index to a deseasonalized value.
    fn reseason(&self, base: f64, index: f64) -> f64 {
        match self.seasonal {
            SeasonalType::None => base,
            SeasonalType::Additive => base + index,
            SeasonalType::Multiplicative => base * index,
        }
    }
}

/// Smoothing weights; absent components keep their neutral value.
#[derive(Debug, Clone, Copy)]
struct HwWeights {
    alpha: f64,
    beta: f64,
    gamma: f64,
    phi: f64,
}

impl HwWeights {
    /// Decode an optimizer point laid out as `[alpha, (beta), (gamma), (phi)]`.
    fn decode(raw: &[f64], spec: HwSpec) -> Self {
        let mut it = raw.iter().copied();
        let alpha = it.next().unwrap_or(0.3);
        let beta = if spec.has_trend() { it.next().unwrap_or(0.0) } else { 0.0 };
        let gamma = if spec.has_season() { it.next().unwrap_or(0.0) } else { 0.0 };
        let phi = if spec.is_damped() { it.next().unwrap_or(1.0) } else { 1.0 };
        Self {
            alpha,
            beta,
            gamma,
            phi,
        }
    }

    /// Starting point and box for the optimizer, in `decode` order.
    fn search_space(spec: HwSpec) -> (Vec<f64>, NelderMeadBounds) {
        let mut start = vec![0.3];
        let mut lower = vec![0.001];
        let mut upper = vec![0.999];
        let mut push = |s: f64, lo: f64, hi: f64| {
            start.push(s);
            lower.push(lo);
            upper.push(hi);
        };
        if spec.has_trend() {
            push(0.05, 0.001, 0.5);
        }
        if spec.has_season() {
            push(0.1, 0.001, 0.999);
        }
        if spec.is_damped() {
            push(0.95, 0.8, 0.999);
        }
        (start, NelderMeadBounds { lower, upper })
    }

    /// `phi + phi^2 + ... + phi^h`.
    fn damped_sum(&self, h: usize) -> f64 {
        if (self.phi - 1.0).abs() < 1e-12 {
            h as f64
        } else {
            self.phi * (1.0 - self.phi.powi(h as i32)) / (1.0 - self.phi)
        }
    }
}

#[derive(Debug, Clone)]
struct HwState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

impl HwState {
    /// Level from the first cycle, trend from the first two cycles.
    fn initial(values: &[f64], m: usize, spec: HwSpec) -> Self {
        let first = &values[..m];
        let level = first.iter().sum::<f64>() / m as f64;

        let trend = if !spec.has_trend() {
            0.0
        } else if values.len() >= 2 * m {
            let next = values[m..2 * m].iter().sum::<f64>() / m as f64;
            (next - level) / m as f64
        } else if values.len() > 1 {
            (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64
        } else {
            0.0
        };

        let seasonal = match spec.seasonal {
            SeasonalType::None => vec![0.0; m],
            SeasonalType::Multiplicative if level.abs() >= EPS => {
                first.iter().map(|v| v / level).collect()
            }
            // Additive, or multiplicative around a zero level
            _ => first.iter().map(|v| v - level).collect(),
        };

        Self {
            level,
            trend,
            seasonal,
        }
    }

    /// Absorb observation `y` at position `t`; returns the one-step error.
    fn update(&mut self, y: f64, t: usize, spec: HwSpec, w: &HwWeights) -> f64 {
        let m = self.seasonal.len();
        let index = self.seasonal[t % m];
        let base = self.level + w.phi * self.trend;

        let error = y - spec.reseason(base, index);

        let level = match spec.seasonal {
            SeasonalType::None => w.alpha * y + (1.0 - w.alpha) * base,
            SeasonalType::Additive => w.alpha * (y - index) + (1.0 - w.alpha) * base,
            SeasonalType::Multiplicative if index.abs() < EPS => base,
            SeasonalType::Multiplicative => w.alpha * (y / index) + (1.0 - w.alpha) * base,
        };

        if spec.has_trend() {
            self.trend = w.beta * (level - self.level) + (1.0 - w.beta) * w.phi * self.trend;
        }

        self.seasonal[t % m] = match spec.seasonal {
            SeasonalType::None => 0.0,
            SeasonalType::Additive => w.gamma * (y - level) + (1.0 - w.gamma) * index,
            SeasonalType::Multiplicative if base.abs() < EPS => index,
            SeasonalType::Multiplicative => w.gamma * (y / base) + (1.0 - w.gamma) * index,
        };

        self.level = level;
        error
    }
}

/// Final smoothing state of a fitted Holt-Winters model.
#[derive(Debug, Clone)]
pub(crate) struct FittedHw {
    state: HwState,
    weights: HwWeights,
    sse: f64,
    n: usize,
    pub spec: HwSpec,
}

impl FittedHw {
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let m = self.state.seasonal.len();
        (1..=horizon)
            .map(|h| {
                let trend = if self.spec.has_trend() {
                    self.weights.damped_sum(h) * self.state.trend
                } else {
                    0.0
                };
                let index = self.state.seasonal[(self.n + h - 1) % m];
                self.spec.reseason(self.state.level + trend, index)
            })
            .collect()
    }

    pub fn num_params(&self) -> usize {
        self.spec.num_params(self.state.seasonal.len())
    }
}

/// Run the recursions over the whole window; the first cycle only seeds state.
fn smooth(values: &[f64], m: usize, spec: HwSpec, weights: HwWeights) -> FittedHw {
    let mut state = HwState::initial(values, m, spec);
    let sse = (m..values.len())
        .map(|t| state.update(values[t], t, spec, &weights).powi(2))
        .sum();
    FittedHw {
        state,
        weights,
        sse,
        n: values.len(),
        spec,
    }
}

fn optimize(values: &[f64], m: usize, spec: HwSpec) -> FittedHw {
    let (start, bounds) = HwWeights::search_space(spec);

    let result = nelder_mead(
        |raw| {
            let sse = smooth(values, m, spec, HwWeights::decode(raw, spec)).sse;
            if sse.is_finite() {
                sse
            } else {
                f64::MAX
            }
        },
        &start,
        &bounds,
        MAX_ITER,
        TOLERANCE,
    );

    debug!(
        trend = ?spec.trend,
        seasonal = ?spec.seasonal,
        iterations = result.iterations,
        converged = result.converged,
        "Holt-Winters optimizer finished"
    );

    smooth(values, m, spec, HwWeights::decode(&result.point, spec))
}

fn compute_aicc(sse: f64, n: usize, spec: HwSpec, m: usize) -> f64 {
    let n_f = n as f64;
    let k = spec.num_params(m) as f64;
    if n_f - k - 1.0 <= 0.0 {
        return f64::INFINITY;
    }
    // Floor keeps exact fits away from ln(0)
    let mse = (sse / n_f).max(1e-300);
    n_f * mse.ln() + 2.0 * k + 2.0 * k * (k + 1.0) / (n_f - k - 1.0)
}

fn candidate_specs() -> Vec<HwSpec> {
    let trends = [TrendType::None, TrendType::Additive, TrendType::AdditiveDamped];
    let seasonals = [
        SeasonalType::None,
        SeasonalType::Additive,
        SeasonalType::Multiplicative,
    ];
    trends
        .iter()
        .flat_map(|&trend| seasonals.iter().map(move |&seasonal| HwSpec { trend, seasonal }))
        .collect()
}

/// Fit every Holt-Winters spec and keep the lowest AICc.
///
/// Specs whose AICc is infinite (too many parameters for the window) or whose
/// fit diverged are skipped; if none survive the fit fails.
pub(crate) fn hw_fit(values: &[f64], season_length: usize) -> Result<FittedHw> {
    let n = values.len();
    let m = season_length;

    if m == 0 || n < 2 * m {
        return Err(ForecastError::Fit(format!(
            "Holt-Winters requires at least 2 full seasonal cycles ({} points), got {}",
            2 * m,
            n
        )));
    }

    let mut best: Option<(f64, FittedHw)> = None;

    for spec in candidate_specs() {
        let fitted = optimize(values, m, spec);
        let aicc = compute_aicc(fitted.sse, n, spec, m);
        if !fitted.sse.is_finite() || !aicc.is_finite() {
            continue;
        }

        debug!(
            trend = ?spec.trend,
            seasonal = ?spec.seasonal,
            sse = fitted.sse,
            aicc,
            alpha = fitted.weights.alpha,
            "Holt-Winters candidate"
        );

        if best.as_ref().map_or(true, |(b, _)| aicc < *b) {
            best = Some((aicc, fitted));
        }
    }

    let (aicc, fitted) = best.ok_or_else(|| {
        ForecastError::Fit(format!(
            "no Holt-Winters candidate has a finite AICc on {n} points with season {m}"
        ))
    })?;

    debug!(
        trend = ?fitted.spec.trend,
        seasonal = ?fitted.spec.seasonal,
        aicc,
        "Holt-Winters selected model"
    );

    Ok(fitted)
}

#[cfg(test)]
mod tests;
