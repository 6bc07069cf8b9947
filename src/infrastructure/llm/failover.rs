use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ports::AnswerGenerator, DomainError, Message};

/// Tries providers in configured order; the first answer wins.
pub struct FailoverGenerator {
    providers: Vec<Arc<dyn AnswerGenerator>>,
    timeout: Option<Duration>,
}

impl FailoverGenerator {
    pub fn new(providers: Vec<Arc<dyn AnswerGenerator>>) -> Self {
        Self {
            providers,
            timeout: None,
        }
    }

    /// Bounds each provider attempt; an elapsed attempt counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn chain_len(&self) -> usize {
        self.providers.len()
    }

    async fn attempt(
        &self,
        provider: &dyn AnswerGenerator,
        turns: &[Message],
    ) -> Result<String, DomainError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, provider.generate(turns))
                .await
                .map_err(|_| {
                    DomainError::timeout(format!(
                        "{} did not answer within {}s",
                        provider.name(),
                        limit.as_secs()
                    ))
                })?,
            None => provider.generate(turns).await,
        }
    }
}

#[async_trait]
impl AnswerGenerator for FailoverGenerator {
    fn name(&self) -> &str {
        self.providers
            .first()
            .map(|p| p.name())
            .unwrap_or("failover")
    }

    async fn generate(&self, turns: &[Message]) -> Result<String, DomainError> {
        let mut last_error = None;

        for (idx, provider) in self.providers.iter().enumerate() {
            match self.attempt(provider.as_ref(), turns).await {
                Ok(answer) => {
                    if idx > 0 {
                        tracing::info!(provider = provider.name(), "answered by fallback provider");
                    }
                    return Ok(answer);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DomainError::generation("no providers configured")))
    }
}
