use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "postgres")]
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("row decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for scce_core::SccError {
    fn from(err: StorageError) -> Self {
        scce_core::SccError::Unavailable(err.to_string())
    }
}
