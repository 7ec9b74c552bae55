use std::collections::{BTreeMap, BTreeSet};

use common::{ForecastError, ProductSelection, Result, Series};
use tracing::{debug, info};

/// Read-only collection of cleaned product series for one run.
///
/// Ingestion and cleaning happen upstream; once built the store is immutable.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<String, Series>,
}

impl SeriesStore {
    pub fn new(series: impl IntoIterator<Item = Series>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for s in series {
            let id = s.product_id().to_string();
            if map.contains_key(&id) {
                return Err(ForecastError::InvalidInput(format!(
                    "duplicate product id: {id}"
                )));
            }
            map.insert(id, s);
        }
        info!(products = map.len(), "Series store loaded");
        Ok(Self { series: map })
    }

    pub fn get_series(&self, product_id: &str) -> Result<&Series> {
        self.series
            .get(product_id)
            .ok_or_else(|| ForecastError::NotFound(product_id.to_string()))
    }

    pub fn list_products(&self) -> BTreeSet<String> {
        self.series.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Resolve a product selection to an ordered list of product ids.
    ///
    /// `Only` fails with `NotFound` on the first unknown id.
    /// `TopByVolume` ranks by total demand, ties broken by product id.
    pub fn resolve(&self, selection: &ProductSelection) -> Result<Vec<String>> {
        match selection {
            ProductSelection::All => Ok(self.series.keys().cloned().collect()),
            ProductSelection::Only(ids) => {
                for id in ids {
                    self.get_series(id)?;
                }
                Ok(ids.iter().cloned().collect())
            }
            ProductSelection::TopByVolume(n) => {
                let mut ranked: Vec<(&String, f64)> = self
                    .series
                    .iter()
                    .map(|(id, s)| (id, s.total_demand()))
                    .collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                ranked.truncate(*n);
                debug!(selected = ranked.len(), requested = n, "Top products by volume");
                let mut ids: Vec<String> = ranked.into_iter().map(|(id, _)| id.clone()).collect();
                ids.sort();
                Ok(ids)
            }
        }
    }
}
