//! Recommendation Engine - item-to-item lookups over the similarity model
//!
//! Answers "readers who liked this book also liked..." by reading one row of
//! the precomputed similarity matrix and ranking it.
//!
//! ## Contract
//! Queries never fail. An unknown title yields an empty list and a title
//! with no catalog record yields a result with empty author and image URL,
//! so callers only ever check for emptiness.

use crate::cover::CoverRequest;
use crate::ranking::rank_neighbors;
use crate::types::Recommendation;
use data_loader::{Artifacts, BookRecord, Catalog, PopularityRow, PopularityTable, SimilarityModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Display limits used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recommendations shown when the caller doesn't ask for a number
    pub default_top_k: usize,
    /// Upper bound the presentation layer allows
    pub max_top_k: usize,
    /// Rows shown in the popular listing
    pub popular_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_k: 6,
            max_top_k: 12,
            popular_limit: 12,
        }
    }
}

impl EngineConfig {
    /// Clamp a requested k to `max_top_k`
    pub fn clamp_top_k(&self, requested: usize) -> usize {
        requested.min(self.max_top_k)
    }
}

/// Read-only recommendation engine.
///
/// Holds the loaded artifacts behind `Arc`, so clones are cheap and can be
/// handed to any number of threads without locking.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    model: Arc<SimilarityModel>,
    popularity: Arc<PopularityTable>,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine from freshly loaded artifacts
    pub fn new(artifacts: Artifacts) -> Self {
        Self::from_shared(
            Arc::new(artifacts.catalog),
            Arc::new(artifacts.model),
            Arc::new(artifacts.popularity),
        )
    }

    /// Create an engine over artifacts that are already shared
    pub fn from_shared(
        catalog: Arc<Catalog>,
        model: Arc<SimilarityModel>,
        popularity: Arc<PopularityTable>,
    ) -> Self {
        Self {
            catalog,
            model,
            popularity,
            config: EngineConfig::default(),
        }
    }

    /// Configure display limits (default: `EngineConfig::default()`)
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &SimilarityModel {
        &self.model
    }

    /// Titles most similar to `title`, best first
    ///
    /// Returns at most `top_k` entries, never `title` itself.
    #[instrument(skip(self), level = "debug")]
    pub fn recommend(&self, title: &str, top_k: usize) -> Vec<Recommendation> {
        let Some(row) = self.model.row_index_of(title) else {
            debug!("'{}' is not in the pivot table", title);
            return Vec::new();
        };
        let Some(scores) = self.model.scores_for(row) else {
            return Vec::new();
        };

        let neighbors = rank_neighbors(scores, row, top_k);
        debug!("Ranked {} neighbors of row {}", neighbors.len(), row);

        neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let title = self.model.row_key_at(neighbor.position)?;
                let (author, image_url) = match self.catalog.lookup_by_title(title) {
                    Some(record) => (
                        record.author.clone(),
                        record.images.preferred().unwrap_or_default().to_string(),
                    ),
                    None => {
                        warn!("No catalog record for '{}'", title);
                        (String::new(), String::new())
                    }
                };
                Some(Recommendation {
                    title: title.to_string(),
                    author,
                    image_url,
                    score: neighbor.score,
                    position: neighbor.position,
                })
            })
            .collect()
    }

    /// `recommend` with the configured default k
    pub fn recommend_default(&self, title: &str) -> Vec<Recommendation> {
        self.recommend(title, self.config.default_top_k)
    }

    /// First `n` rows of the popularity table, in table order
    pub fn top_popular(&self, n: usize) -> &[PopularityRow] {
        self.popularity.top(n)
    }

    /// Canonical catalog record for a title
    pub fn lookup_by_title(&self, title: &str) -> Option<&BookRecord> {
        self.catalog.lookup_by_title(title)
    }

    /// Every title the model can recommend from, in pivot order
    pub fn list_known_titles(&self) -> impl Iterator<Item = &str> {
        self.model.pivot().titles().iter().map(String::as_str)
    }

    /// Cover lookup plan for a title, falling back to a placeholder
    pub fn cover_request(&self, title: &str) -> CoverRequest {
        match self.lookup_by_title(title) {
            Some(record) => CoverRequest::for_record(record),
            None => CoverRequest::placeholder(title),
        }
    }
}
