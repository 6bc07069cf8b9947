use futures::future::join_all;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::knowledge_base::load_collection;
use crate::domain::{
    ports::{EmbeddingService, SeedLock, VectorStore, VectorStoreProvider},
    Collection, DomainError,
};

/// Searchable collections, keyed by name. Built once at startup and
/// read-only afterwards.
#[derive(Default, Clone)]
pub struct StoreRegistry {
    stores: BTreeMap<String, Arc<dyn VectorStore>>,
}

impl StoreRegistry {
    pub fn new(stores: impl IntoIterator<Item = Arc<dyn VectorStore>>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|s| (s.collection().to_string(), s))
                .collect(),
        }
    }

    pub fn get(&self, collection: &str) -> Option<&Arc<dyn VectorStore>> {
        self.stores.get(collection)
    }

    pub fn names(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// What a seeding pass did to each collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Written during this pass.
    pub seeded: Vec<String>,
    /// Already had content and were left alone.
    pub populated: Vec<String>,
    /// Claimed by another instance, or nothing to write.
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

enum SeedOutcome {
    Seeded(usize),
    AlreadyPopulated,
    ClaimedElsewhere,
    EmptySource,
}

pub struct VectorStoreManager {
    provider: Arc<dyn VectorStoreProvider>,
    embedding: Arc<dyn EmbeddingService>,
    seed_lock: Arc<dyn SeedLock>,
}

impl VectorStoreManager {
    pub fn new(
        provider: Arc<dyn VectorStoreProvider>,
        embedding: Arc<dyn EmbeddingService>,
        seed_lock: Arc<dyn SeedLock>,
    ) -> Self {
        Self {
            provider,
            embedding,
            seed_lock,
        }
    }

    /// Finds `{cv|faq}_{xx}.txt` sources in `data_dir`. The result is sorted
    /// by collection name; a name claimed by several files (differing only in
    /// case) keeps the lexicographically first path.
    pub async fn discover_collections(data_dir: &Path) -> Result<Vec<Collection>, DomainError> {
        let mut entries = tokio::fs::read_dir(data_dir).await.map_err(|e| {
            DomainError::not_found(format!("data directory {}: {e}", data_dir.display()))
        })?;

        let mut found: BTreeMap<String, Collection> = BTreeMap::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
        {
            let file_name = entry.file_name();
            let Some((doc_type, language)) = file_name
                .to_str()
                .and_then(Collection::parse_source_name)
            else {
                continue;
            };

            let collection = Collection::new(doc_type, language, entry.path());
            match found.get(&collection.name) {
                Some(existing) if existing.source <= collection.source => {}
                _ => {
                    found.insert(collection.name.clone(), collection);
                }
            }
        }

        Ok(found.into_values().collect())
    }

    /// Number of indexed chunks. Any backend error counts as empty so the
    /// collection gets a seeding attempt instead of being silently skipped.
    pub async fn count(&self, collection: &Collection) -> u64 {
        let counted = match self.provider.open(&collection.name).await {
            Ok(store) => store.count().await,
            Err(e) => Err(e),
        };

        counted.unwrap_or_else(|e| {
            tracing::warn!(collection = %collection.name, error = %e, "count failed, treating as empty");
            0
        })
    }

    /// Seeds when forced or when any collection is empty.
    ///
    /// Forced passes rewrite every collection and then drop chunks the
    /// source no longer produces; otherwise only the empty ones are written. Each write happens under a seed claim, and a
    /// failure in one collection never stops the others.
    #[instrument(skip_all, fields(collections = collections.len(), force = force))]
    pub async fn ensure_seeded(&self, collections: &mut [Collection], force: bool) -> SeedReport {
        let counts = join_all(collections.iter().map(|c| self.count(c))).await;
        let need_seed = force || counts.iter().any(|&n| n == 0);
        let mut report = SeedReport::default();

        for (collection, count) in collections.iter_mut().zip(counts) {
            if need_seed && (force || count == 0) {
                if force && count > 0 {
                    tracing::warn!(collection = %collection.name, count, "force seeding enabled");
                } else {
                    tracing::warn!(collection = %collection.name, "collection empty, seeding");
                }

                match self.seed_collection(collection, force).await {
                    Ok(SeedOutcome::Seeded(chunks)) => {
                        tracing::info!(collection = %collection.name, chunks, "collection seeded");
                        collection.seeded = true;
                        report.seeded.push(collection.name.clone());
                    }
                    Ok(SeedOutcome::AlreadyPopulated) => {
                        collection.seeded = true;
                        report.populated.push(collection.name.clone());
                    }
                    Ok(SeedOutcome::ClaimedElsewhere) => {
                        tracing::info!(collection = %collection.name, "seeding claimed by another instance");
                        report.skipped.push(collection.name.clone());
                    }
                    Ok(SeedOutcome::EmptySource) => {
                        report.skipped.push(collection.name.clone());
                    }
                    Err(e) => {
                        tracing::error!(collection = %collection.name, error = %e, "seeding failed");
                        report.failed.push(collection.name.clone());
                    }
                }
            } else {
                collection.seeded = true;
                report.populated.push(collection.name.clone());
            }
        }

        report
    }

    async fn seed_collection(
        &self,
        collection: &Collection,
        force: bool,
    ) -> Result<SeedOutcome, DomainError> {
        let claimed = self
            .seed_lock
            .try_claim(&collection.name)
            .await
            .map_err(|e| DomainError::seeding(format!("claim failed: {e}")))?;
        if !claimed {
            return Ok(SeedOutcome::ClaimedElsewhere);
        }

        let outcome = self.write_collection(collection, force).await;

        if let Err(e) = self.seed_lock.release(&collection.name).await {
            tracing::warn!(collection = %collection.name, error = %e, "failed to release seed claim");
        }
        outcome
    }

    async fn write_collection(
        &self,
        collection: &Collection,
        force: bool,
    ) -> Result<SeedOutcome, DomainError> {
        let seeding = |e: DomainError| DomainError::seeding(format!("{}: {e}", collection.name));
        let store = self.provider.open(&collection.name).await.map_err(seeding)?;

        if !force && store.count().await.unwrap_or(0) > 0 {
            // Another instance finished between our count and our claim.
            return Ok(SeedOutcome::AlreadyPopulated);
        }

        // Existing points stay untouched until the replacement is embedded
        // and written.
        let chunks = load_collection(collection).await?;
        if chunks.is_empty() {
            return Ok(SeedOutcome::EmptySource);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await.map_err(seeding)?;
        store.upsert(&chunks, &embeddings).await.map_err(seeding)?;

        if force {
            let keep: Vec<Uuid> = chunks.iter().map(|c| c.id).collect();
            if let Err(e) = store.retain_only(&keep).await {
                tracing::warn!(collection = %collection.name, error = %e, "failed to prune stale chunks");
            }
        }

        Ok(SeedOutcome::Seeded(chunks.len()))
    }

    /// One handle per collection. Collections whose handle cannot be built
    /// are left out rather than failing startup.
    pub async fn open(&self, collections: &[Collection]) -> StoreRegistry {
        let opened = join_all(collections.iter().map(|c| async move {
            (c.name.as_str(), self.provider.open(&c.name).await)
        }))
        .await;

        let stores = opened.into_iter().filter_map(|(name, result)| match result {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(collection = name, error = %e, "collection unavailable, omitting");
                None
            }
        });

        StoreRegistry::new(stores)
    }

    /// Discover, seed, open. Never fails: a broken data directory or backend
    /// yields an empty or partial registry.
    #[instrument(skip(self))]
    pub async fn initialize(&self, data_dir: &Path, force: bool) -> StoreRegistry {
        let mut collections = match Self::discover_collections(data_dir).await {
            Ok(collections) => collections,
            Err(e) => {
                tracing::warn!(error = %e, "knowledge sources not found");
                return StoreRegistry::default();
            }
        };
        if collections.is_empty() {
            tracing::warn!(data_dir = %data_dir.display(), "no cv/faq sources found");
            return StoreRegistry::default();
        }

        let report = self.ensure_seeded(&mut collections, force).await;
        if !report.failed.is_empty() {
            tracing::error!(failed = ?report.failed, "some collections could not be seeded");
        }

        let registry = self.open(&collections).await;
        if registry.is_empty() {
            tracing::warn!("no vector stores loaded");
        } else {
            tracing::info!(collections = ?registry.names(), "vector stores initialized");
        }
        registry
    }
}
