use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilamentError {
    #[error("Invalid grid ({n_r} points): {message}")]
    InvalidGrid { n_r: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FilamentResult<T> = Result<T, FilamentError>;
