use muviz_api::tmdb::TmdbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MuvizError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("media {0} is already a favorite")]
    DuplicateFavorite(u64),

    #[error("config error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] TmdbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
