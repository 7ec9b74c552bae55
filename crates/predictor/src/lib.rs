mod pipeline;
mod report;

pub use pipeline::run;
pub use report::{ForecastReport, ForecastRow, ProductRow};
