use crate::domain::{EvidenceSet, InteractionLog, Language, Message, FALLBACK_ANSWER};

/// Builds the turn sequence handed to the answer generator.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Evidence blocks, one per chunk, each tagged with its collection.
    pub fn context_blocks(evidence: &EvidenceSet) -> String {
        evidence
            .chunks
            .iter()
            .map(|chunk| format!("[source: {}]\n{}", chunk.source_collection, chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn system_instruction(language: Language, evidence: &EvidenceSet) -> String {
        format!(
            "You are an assistant answering questions about Jorge's professional profile.\n\
             Answer only in {language_name} ({language_code}).\n\
             Use ONLY the context blocks below. Each block starts with [source: <collection>].\n\
             If the answer is not explicitly in the context, respond with exactly:\n\
             \"{fallback}\"\n\
             For questions about preferences or logistics (availability, relocation, salary, \
             remote work, notice period), prefer blocks whose source is a faq collection.\n\n\
             Context:\n{context}",
            language_name = language.display_name(),
            language_code = language.code(),
            fallback = FALLBACK_ANSWER,
            context = Self::context_blocks(evidence),
        )
    }

    /// System instruction, then the window as user/assistant pairs oldest
    /// first, then the current question.
    pub fn assemble(
        language: Language,
        evidence: &EvidenceSet,
        window: &[InteractionLog],
        question: &str,
    ) -> Vec<Message> {
        let mut turns = Vec::with_capacity(window.len() * 2 + 2);
        turns.push(Message::system(Self::system_instruction(language, evidence)));

        for log in window {
            turns.push(Message::user(log.question.as_str()));
            turns.push(Message::assistant(log.answer.as_str()));
        }

        turns.push(Message::user(question));
        turns
    }
}
