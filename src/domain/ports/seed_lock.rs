use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Cross-process claim on seeding a collection.
#[async_trait]
pub trait SeedLock: Send + Sync {
    /// Returns `false` when another holder already owns the claim.
    async fn try_claim(&self, collection: &str) -> Result<bool, DomainError>;
    async fn release(&self, collection: &str) -> Result<(), DomainError>;
}
