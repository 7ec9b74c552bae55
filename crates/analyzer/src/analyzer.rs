use common::SeasonalityInfo;
use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::debug;

/// Minimum window for spectral analysis.
const MIN_POINTS: usize = 10;
/// Peaks weaker than this share of the strongest bin are ignored.
const PEAK_FLOOR: f64 = 0.1;

/// Spectral analysis of a demand window.
pub struct TimeSeriesAnalyzer;

impl TimeSeriesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Detect the dominant cycle of `values` from its power spectrum.
    ///
    /// The window is detrended first so a linear trend does not swamp the
    /// low frequencies. The strongest local peak is refined by parabolic
    /// interpolation between neighbouring bins.
    pub fn detect_seasonality(&self, values: &[f64]) -> SeasonalityInfo {
        let n = values.len();
        if n < MIN_POINTS {
            return weak();
        }

        let residual = detrend(values);
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        // Residuals within 1% of the data range carry no cycle
        if variance(&residual) < ((hi - lo) * 0.01).powi(2) {
            return weak();
        }

        let power = power_spectrum(&residual);
        // Positive frequencies, bins 1..n/2
        let band = &power[1..n / 2];
        let floor = PEAK_FLOOR * power.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let Some(peak) = local_maxima(band, floor)
            .into_iter()
            .max_by(|&a, &b| band[a].total_cmp(&band[b]))
        else {
            return weak();
        };

        let bin = refine_peak(band, peak) + 1.0;
        let frequency = bin / n as f64;
        let period = (frequency > 1e-10).then(|| (1.0 / frequency).round() as usize);

        let total: f64 = power.iter().sum();
        let score = if total > 0.0 { power[peak + 1] / total } else { 0.0 };
        let strength = match score {
            s if s > 0.3 => "strong",
            s if s > 0.1 => "moderate",
            _ => "weak",
        };

        debug!(
            period = ?period,
            strength,
            score = format!("{:.3}", score),
            "Seasonality detected"
        );

        SeasonalityInfo {
            strength: strength.into(),
            period,
            score,
            dominant_frequency: Some(frequency),
        }
    }

    /// Seasonal period usable by the fitters, if one is clearly present.
    ///
    /// Only non-weak cycles of length 2..=n/2 qualify, so at least two
    /// full cycles exist in the window.
    pub fn season_length(&self, values: &[f64]) -> Option<usize> {
        let info = self.detect_seasonality(values);
        if info.strength == "weak" {
            return None;
        }
        info.period.filter(|&p| p >= 2 && p <= values.len() / 2)
    }
}

impl Default for TimeSeriesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn weak() -> SeasonalityInfo {
    SeasonalityInfo {
        strength: "weak".into(),
        ..SeasonalityInfo::default()
    }
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

/// Residuals of a least-squares line over the index.
fn detrend(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let (sxy, sxx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
    let slope = if sxx > 1e-15 { sxy / sxx } else { 0.0 };
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - x_mean)))
        .collect()
}

fn power_spectrum(values: &[f64]) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v, 0.0)).collect();
    FftPlanner::new()
        .plan_fft_forward(buffer.len())
        .process(&mut buffer);
    buffer.iter().map(|c| c.norm_sqr()).collect()
}

/// Interior local maxima at or above `floor`.
fn local_maxima(data: &[f64], floor: f64) -> Vec<usize> {
    data.windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] >= floor)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Fractional bin of the vertex of the parabola through a peak and its neighbours.
fn refine_peak(data: &[f64], peak: usize) -> f64 {
    if peak == 0 || peak + 1 >= data.len() {
        return peak as f64;
    }
    let (prev, curr, next) = (data[peak - 1], data[peak], data[peak + 1]);
    let denom = prev - 2.0 * curr + next;
    if denom.abs() <= 1e-10 {
        return peak as f64;
    }
    peak as f64 + (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
}
