use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::{context::ContextAssembler, history::SessionHistoryService, retrieval::RetrievalRouter};
use crate::domain::{ports::AnswerGenerator, DomainError, Language, FALLBACK_ANSWER};

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub session_id: Option<String>,
    pub language: Option<String>,
    pub client_ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskOutcome {
    pub question: String,
    pub answer: String,
    pub session_id: String,
    pub language: Language,
    /// Winning collection, or `None` when the fallback answer was used.
    pub source: Option<String>,
}

/// One question, end to end: history, retrieval, generation, persistence.
pub struct AskService {
    router: RetrievalRouter,
    history: Arc<SessionHistoryService>,
    generator: Arc<dyn AnswerGenerator>,
}

impl AskService {
    pub fn new(
        router: RetrievalRouter,
        history: Arc<SessionHistoryService>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            router,
            history,
            generator,
        }
    }

    #[instrument(skip(self, request), fields(session_id, language))]
    pub async fn ask(&self, request: AskRequest) -> Result<AskOutcome, DomainError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }

        let session_id = request
            .session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let language = Language::coerce(request.language.as_deref());

        let span = tracing::Span::current();
        span.record("session_id", session_id.as_str());
        span.record("language", language.code());

        let window = self.history.conversation_window(&session_id).await;

        let (answer, source) = match self.router.retrieve(question, language).await {
            None => {
                tracing::info!("no evidence found, answering with fallback");
                (FALLBACK_ANSWER.to_string(), None)
            }
            Some(evidence) => {
                let turns = ContextAssembler::assemble(language, &evidence, &window, question);
                let answer = self.generator.generate(&turns).await.inspect_err(|e| {
                    tracing::error!(provider = self.generator.name(), error = %e, "generation failed")
                })?;
                (answer, Some(evidence.source_collection))
            }
        };

        self.history
            .append_interaction(&session_id, question, &answer, &request.client_ip)
            .await?;

        Ok(AskOutcome {
            question: question.to_string(),
            answer,
            session_id,
            language,
            source,
        })
    }
}
