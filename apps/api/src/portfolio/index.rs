//! Portfolio Index — embedding-backed nearest-neighbor store.
//!
//! Seed-once semantics: the corpus is embedded and inserted on the first
//! `seed` call; every later call is a no-op while the index holds entries,
//! regardless of content drift in the source table. Clearing requires a
//! process restart.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::portfolio::embedder::Embedder;
use crate::portfolio::source::PortfolioEntry;

/// One retrieved reference link, ordered by descending similarity.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedLink {
    pub link: String,
}

/// A seeded entry with its tag-text embedding. Position in the store is the
/// insertion order used for similarity tie-breaks.
struct IndexedEntry {
    entry: PortfolioEntry,
    embedding: Vec<f32>,
}

/// Read-mostly nearest-neighbor store shared across requests for the
/// lifetime of the process.
pub struct PortfolioIndex {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<IndexedEntry>>,
}

impl PortfolioIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Seeds the index from `corpus`. Idempotent: a no-op whenever the index
    /// already holds at least one entry.
    ///
    /// The non-empty check and the insert run under one write lock, so two
    /// orchestrators starting simultaneously cannot double-seed.
    pub async fn seed(&self, corpus: Vec<PortfolioEntry>) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;

        if !entries.is_empty() {
            info!(
                "Portfolio index already holds {} entries — skipping seed",
                entries.len()
            );
            return Ok(());
        }

        let tag_texts: Vec<String> = corpus.iter().map(|e| e.tag_text.clone()).collect();
        let embeddings = self.embedder.embed(&tag_texts).await.map_err(|e| {
            AppError::IndexUnavailable(format!("Failed to embed portfolio corpus: {e}"))
        })?;

        for (entry, embedding) in corpus.into_iter().zip(embeddings) {
            entries.push(IndexedEntry { entry, embedding });
        }

        info!("Portfolio index seeded with {} entries", entries.len());
        Ok(())
    }

    /// Entry count currently held by the index.
    #[allow(dead_code)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns up to `k` nearest links per query text, concatenated in
    /// query-text order. Duplicate links across query texts are NOT
    /// deduplicated — the composer receives the raw concatenation.
    ///
    /// Ranking is cosine similarity, descending; ties keep insertion order.
    pub async fn query(
        &self,
        query_texts: &[String],
        k: usize,
    ) -> Result<Vec<RetrievedLink>, AppError> {
        if query_texts.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embeddings = self.embedder.embed(query_texts).await.map_err(|e| {
            AppError::IndexUnavailable(format!("Failed to embed query texts: {e}"))
        })?;

        let entries = self.entries.read().await;
        let mut results = Vec::new();

        for (query_text, query_embedding) in query_texts.iter().zip(&query_embeddings) {
            let mut scored: Vec<(usize, f32)> = entries
                .iter()
                .enumerate()
                .map(|(position, indexed)| {
                    (position, cosine_similarity(query_embedding, &indexed.embedding))
                })
                .collect();

            // Stable sort: equal similarities keep insertion order.
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            debug!(
                "Query {:?}: top match {:?}",
                query_text,
                scored.first().map(|(pos, sim)| (entries[*pos].entry.link.clone(), *sim))
            );

            results.extend(scored.into_iter().take(k).map(|(position, _)| {
                RetrievedLink {
                    link: entries[position].entry.link.clone(),
                }
            }));
        }

        Ok(results)
    }
}

/// Cosine similarity with a zero-norm guard.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
