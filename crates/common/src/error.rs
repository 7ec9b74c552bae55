use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("product not found: {0}")]
    NotFound(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("fit error: {0}")]
    Fit(String),

    #[error("no eligible model: {0}")]
    NoEligibleModel(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ForecastError {
    /// Stable short tag used in report rows.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::NotFound(_) => "not_found",
            ForecastError::InsufficientData(_) => "insufficient_data",
            ForecastError::InvalidInput(_) => "invalid_input",
            ForecastError::Fit(_) => "fit_error",
            ForecastError::NoEligibleModel(_) => "no_eligible_model",
            ForecastError::Timeout(_) => "timeout",
            ForecastError::Config(_) => "config_error",
            ForecastError::Io(_) => "io_error",
            ForecastError::Serde(_) => "serde_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
