use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("login rejected by catalog service")]
    AuthenticationRejected,
    #[error("query needs at least one parameter")]
    EmptyQuery,
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected a JSON array of records, got: {0}")]
    NotAnArray(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
