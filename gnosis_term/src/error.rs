use gnosis::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not determine data directory")]
    NoDataDir,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config.json: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
