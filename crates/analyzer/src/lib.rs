mod analyzer;

pub use analyzer::TimeSeriesAnalyzer;
