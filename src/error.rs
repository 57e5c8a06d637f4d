use thiserror::Error;

/// Failures surfaced to callers of the FAQ service.
///
/// Translation and cache problems never appear here: translations degrade to
/// the base text and the cache is bypassed when it is unavailable.
#[derive(Debug, Error)]
pub enum FaqError {
    #[error("FAQ not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the persistent record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored FAQ {id} is invalid: {reason}")]
    Corrupt { id: i64, reason: String },
}

pub type FaqResult<T> = Result<T, FaqError>;
