use thiserror::Error;

/// Errors from the TMDB API client.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Transport failure: no connectivity, DNS, TLS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TmdbError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
