use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Seeding failed: {0}")]
    Seeding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("History read failed: {0}")]
    HistoryRead(String),

    #[error("History write failed: {0}")]
    HistoryWrite(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn seeding(msg: impl Into<String>) -> Self {
        Self::Seeding(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn history_read(msg: impl Into<String>) -> Self {
        Self::HistoryRead(msg.into())
    }

    pub fn history_write(msg: impl Into<String>) -> Self {
        Self::HistoryWrite(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// Errors a caller may absorb or retry. Everything else must surface.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::HistoryRead(_) | Self::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(DomainError::store_unavailable("down").is_retryable());
        assert!(DomainError::history_read("down").is_retryable());
        assert!(!DomainError::generation("quota").is_retryable());
        assert!(!DomainError::history_write("disk full").is_retryable());
    }
}
