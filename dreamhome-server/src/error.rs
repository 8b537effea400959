//! Error types for server startup

use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("store error: {0}")]
    Store(#[from] dreamhome_core::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
