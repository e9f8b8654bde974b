use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("records file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("records file is not a JSON array: {0}")]
    InvalidFormat(#[from] serde_json::Error),
    #[error("invalid elements for {name}: {message}")]
    InvalidElements { name: String, message: String },
    #[error("propagation error for {name}: {message}")]
    Propagation { name: String, message: String },
}
