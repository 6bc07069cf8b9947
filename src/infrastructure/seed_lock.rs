use async_trait::async_trait;
use deadpool_redis::redis;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{ports::SeedLock, DomainError};
use crate::infrastructure::redis::{keys, RedisPool};

/// Deletes the claim only when it still holds our owner token.
const RELEASE_SCRIPT: &str =
    r#"if redis.call("GET", KEYS[1]) == ARGV[1] then return redis.call("DEL", KEYS[1]) else return 0 end"#;

/// `SET NX EX` claim shared by every instance pointed at the same Redis.
///
/// The TTL bounds how long a crashed holder can block other instances.
pub struct RedisSeedLock {
    pool: RedisPool,
    owner: String,
    ttl_seconds: u64,
}

impl RedisSeedLock {
    pub fn new(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            pool,
            owner: Uuid::new_v4().to_string(),
            ttl_seconds,
        }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
    }
}

#[async_trait]
impl SeedLock for RedisSeedLock {
    async fn try_claim(&self, collection: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(keys::seed_claim(collection))
            .arg(&self.owner)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn release(&self, collection: &str) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;
        redis::Script::new(RELEASE_SCRIPT)
            .key(keys::seed_claim(collection))
            .arg(&self.owner)
            .invoke_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::external(e.to_string()))
    }
}

/// Claims scoped to this process.
#[derive(Default)]
pub struct InMemorySeedLock {
    held: Mutex<HashSet<String>>,
}

impl InMemorySeedLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedLock for InMemorySeedLock {
    async fn try_claim(&self, collection: &str) -> Result<bool, DomainError> {
        let mut held = self
            .held
            .lock()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(held.insert(collection.to_string()))
    }

    async fn release(&self, collection: &str) -> Result<(), DomainError> {
        self.held
            .lock()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .remove(collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_claim_is_exclusive_until_released() {
        let lock = InMemorySeedLock::new();

        assert!(lock.try_claim("cv_en_embeddings").await.unwrap());
        assert!(!lock.try_claim("cv_en_embeddings").await.unwrap());
        assert!(lock.try_claim("faq_en_embeddings").await.unwrap());

        lock.release("cv_en_embeddings").await.unwrap();
        assert!(lock.try_claim("cv_en_embeddings").await.unwrap());
    }

    #[test]
    fn test_release_script_is_owner_checked() {
        let script = redis::Script::new(RELEASE_SCRIPT);

        assert_eq!(script.get_hash().len(), 40);
        assert!(RELEASE_SCRIPT.contains(r#"redis.call("GET", KEYS[1]) == ARGV[1]"#));
    }
}
