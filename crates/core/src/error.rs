use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid model {path}: {details}")]
    InvalidModel { path: String, details: String },

    #[error("classifier returned {actual} predictions for {expected} rows")]
    PredictionCount { expected: usize, actual: usize },
}
