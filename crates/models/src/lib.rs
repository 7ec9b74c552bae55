mod arima;
mod ets;
mod guard;
mod hw;
mod optimizer;
mod seasonal_naive;

pub use arima::ArimaModel;
pub use ets::EtsModel;
pub use seasonal_naive::SeasonalNaiveModel;

use common::{ArimaConfig, ForecastModel};

/// The candidate set evaluated for every product, simplest first.
pub fn default_models(season_length: usize, arima: ArimaConfig) -> Vec<Box<dyn ForecastModel>> {
    vec![
        Box::new(SeasonalNaiveModel::new(season_length)),
        Box::new(EtsModel::new(Some(season_length))),
        Box::new(ArimaModel::new(arima)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ModelCategory;

    #[test]
    fn test_default_models_ordered_by_category() {
        let models = default_models(12, ArimaConfig::default());
        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["SeasonalNaive", "ETS", "ARIMA"]);
        let categories: Vec<ModelCategory> = models.iter().map(|m| m.category()).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }
}
