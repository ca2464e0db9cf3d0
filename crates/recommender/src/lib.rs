//! # Recommender Crate
//!
//! Item-to-item book recommendations over a precomputed similarity matrix.
//!
//! ## Components
//!
//! ### Recommendation Engine
//! "Readers who liked this book also liked...":
//! - Resolves a title to its pivot row
//! - Ranks every other row by similarity (stable, highest first)
//! - Attaches author and cover URL from the catalog
//!
//! ### Popularity Listing
//! The first `n` rows of the offline popularity table, order untouched.
//!
//! ### Cover Planning
//! Which image URLs to try for a book and the placeholder caption to fall
//! back on. Fetching is left to a `CoverResolver` implementation.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ArtifactPaths, Artifacts};
//! use recommender::RecommendationEngine;
//! use std::path::Path;
//!
//! let artifacts = Artifacts::load_from_files(Path::new("data/book-crossing"), &ArtifactPaths::default())?;
//! let engine = RecommendationEngine::new(artifacts);
//!
//! for rec in engine.recommend("1984", 6) {
//!     println!("{} by {}", rec.title, rec.author);
//! }
//! ```

pub mod cover;
pub mod engine;
pub mod ranking;
pub mod types;

pub use cover::{Cover, CoverRequest, CoverResolver};
pub use engine::{EngineConfig, RecommendationEngine};
pub use types::{Neighbor, Recommendation};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<RecommendationEngine>();
    }
}
