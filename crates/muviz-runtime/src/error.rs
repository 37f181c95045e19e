use muviz_api::tmdb::TmdbError;
use muviz_core::error::MuvizError;

/// Failure category carried through to the user, without losing whether
/// it was connectivity, the server, or a malformed response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("no internet connection")]
    Network,
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response from server")]
    Parse,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("already in favorites")]
    AlreadyFavorite,
    #[error("storage error: {0}")]
    Storage(String),
}

impl LoadError {
    /// Short message suitable for inline error text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network => "Couldn't reach the server. Check your connection.".into(),
            Self::Server { status, .. } => format!("Something went wrong on the server ({status})."),
            Self::Parse => "Received an unexpected response.".into(),
            Self::InvalidRequest(reason) => reason.clone(),
            Self::AlreadyFavorite => "Already in favorites.".into(),
            Self::Storage(_) => "Couldn't access local favorites.".into(),
        }
    }
}

impl From<TmdbError> for LoadError {
    fn from(e: TmdbError) -> Self {
        match e {
            TmdbError::Network(_) => Self::Network,
            TmdbError::Server { status, message } => Self::Server { status, message },
            TmdbError::Parse(_) => Self::Parse,
            TmdbError::InvalidRequest(reason) => Self::InvalidRequest(reason),
        }
    }
}

impl From<MuvizError> for LoadError {
    fn from(e: MuvizError) -> Self {
        match e {
            MuvizError::Api(api) => api.into(),
            MuvizError::DuplicateFavorite(_) => Self::AlreadyFavorite,
            other => Self::Storage(other.to_string()),
        }
    }
}
