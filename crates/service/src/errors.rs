use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backing store unavailable, I/O failure or constraint violation.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Persistence(e.to_string())
    }
}
