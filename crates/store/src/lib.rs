mod split;
mod store;

pub use split::{split, Split};
pub use store::SeriesStore;
