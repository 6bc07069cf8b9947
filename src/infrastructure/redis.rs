use deadpool_redis::{Config, Pool, Runtime};

use crate::domain::DomainError;

pub type RedisPool = Pool;

pub mod keys {
    pub const INTERACTION_SEQ: &str = "interactions:seq";
    pub const INTERACTION_LOG: &str = "interactions:log";

    pub fn session(session_id: &str) -> String {
        format!("session:{}:interactions", session_id)
    }

    pub fn seed_claim(collection: &str) -> String {
        format!("seed:claim:{}", collection)
    }
}

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(keys::session("abc"), "session:abc:interactions");
        assert_eq!(keys::seed_claim("cv_en_embeddings"), "seed:claim:cv_en_embeddings");
    }
}
