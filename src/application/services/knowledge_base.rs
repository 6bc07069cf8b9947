use tracing::instrument;

use crate::domain::{chunk_sections, parse_sections, Collection, DocumentChunk, DomainError};

/// Turns a raw knowledge source into chunks tagged with their collection.
pub fn chunk_source(raw_text: &str, collection: &str) -> Vec<DocumentChunk> {
    chunk_sections(&parse_sections(raw_text), collection)
}

/// Reads a collection's source file and chunks it.
#[instrument(skip_all, fields(collection = %collection.name))]
pub async fn load_collection(collection: &Collection) -> Result<Vec<DocumentChunk>, DomainError> {
    let raw = tokio::fs::read_to_string(&collection.source)
        .await
        .map_err(|e| {
            DomainError::seeding(format!(
                "cannot read {}: {e}",
                collection.source.display()
            ))
        })?;

    if raw.trim().is_empty() {
        tracing::warn!(source = %collection.source.display(), "knowledge source is empty");
        return Ok(Vec::new());
    }

    let chunks = chunk_source(&raw, &collection.name);
    tracing::debug!(chunks = chunks.len(), "knowledge source chunked");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocType;

    #[tokio::test]
    async fn test_load_collection_reads_and_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq_en.txt");
        std::fs::write(&path, "Availability\nOpen to remote roles across all time zones, starting next month.\n").unwrap();

        let collection = Collection::new(DocType::Faq, "en", &path);
        let chunks = load_collection(&collection).await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Availability");
        assert_eq!(chunks[0].source_collection, "faq_en_embeddings");
        assert!(chunks[0].text.starts_with("Availability\nOpen to remote roles"));
    }

    #[tokio::test]
    async fn test_load_collection_missing_file_is_seeding_error() {
        let collection = Collection::new(DocType::Cv, "en", "/nonexistent/cv_en.txt");
        let err = load_collection(&collection).await.unwrap_err();
        assert!(matches!(err, DomainError::Seeding(_)));
    }

    #[tokio::test]
    async fn test_blank_source_yields_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv_es.txt");
        std::fs::write(&path, "  \n\n").unwrap();

        let chunks = load_collection(&Collection::new(DocType::Cv, "es", &path)).await.unwrap();
        assert!(chunks.is_empty());
    }
}
