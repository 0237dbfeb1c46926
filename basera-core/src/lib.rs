pub mod analytics;
pub mod booking;
pub mod listing;
pub mod mail;
pub mod media;
pub mod repository;
pub mod settings;
pub mod user;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
