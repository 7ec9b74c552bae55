use common::{ForecastError, Result, Series};

/// Training prefix and holdout suffix of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub training: Series,
    pub holdout: Series,
}

/// Partition `series` into a training window and the last `holdout_length` periods.
///
/// Fails with `InsufficientData` unless `1 <= holdout_length < series.len()`.
/// Short products are excluded, never given a reduced holdout.
pub fn split(series: &Series, holdout_length: usize) -> Result<Split> {
    let n = series.len();
    if holdout_length == 0 || holdout_length >= n {
        return Err(ForecastError::InsufficientData(format!(
            "{}: {} observations cannot cover a holdout of {}",
            series.product_id(),
            n,
            holdout_length
        )));
    }

    let cut = n - holdout_length;
    let (train_obs, holdout_obs) = series.observations().split_at(cut);

    Ok(Split {
        training: Series::with_frequency(
            series.product_id(),
            series.frequency(),
            train_obs.to_vec(),
        )?,
        holdout: Series::with_frequency(
            series.product_id(),
            series.frequency(),
            holdout_obs.to_vec(),
        )?,
    })
}
