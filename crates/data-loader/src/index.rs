//! One-time loading of all artifacts.
//!
//! Loading is the only fallible step in the system: every structural problem
//! (missing files, malformed lines, a similarity matrix that does not match
//! the pivot table) is reported here, before any query is served.

use crate::config::{ArtifactPaths, ResolvedPaths};
use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

impl Artifacts {
    /// Load every artifact from `data_dir`
    ///
    /// Steps:
    /// 1. Check all required files exist, reporting every missing one at once
    /// 2. Parse the four files in parallel
    /// 3. Pair the pivot with the similarity matrix (size-checked)
    /// 4. Build the de-duplicated catalog
    pub fn load_from_files(data_dir: &Path, paths: &ArtifactPaths) -> Result<Self> {
        info!("Loading book artifacts from {:?}", data_dir);
        let resolved = paths.resolve(data_dir);

        let missing = resolved.missing_required();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingArtifacts { files: missing });
        }

        let ((books, pivot), (matrix, popular)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_books(&resolved.books),
                    || parser::parse_pivot(&resolved.pivot),
                )
            },
            || {
                rayon::join(
                    || parser::parse_similarity(&resolved.similarity),
                    || load_popular(&resolved),
                )
            },
        );

        let books = books?;
        let pivot = pivot?;
        let matrix = matrix?;
        let popular = popular?;

        info!(
            "Parsed {} catalog rows, {} pivot titles x {} raters, {}x{} similarity matrix, {} popular rows",
            books.len(),
            pivot.row_count(),
            pivot.rater_count(),
            matrix.side(),
            matrix.side(),
            popular.len()
        );

        let artifacts = Self::from_parts(books, pivot, matrix, popular)?;
        info!("Artifacts loaded and validated");
        Ok(artifacts)
    }

    /// Assemble artifacts from already-parsed parts
    pub fn from_parts(
        books: Vec<BookRecord>,
        pivot: InteractionMatrix,
        matrix: SimilarityMatrix,
        popular: Vec<PopularityRow>,
    ) -> Result<Self> {
        let model = SimilarityModel::new(pivot, matrix)?;
        let catalog = Catalog::from_records(books);

        let uncatalogued = model
            .pivot()
            .titles()
            .iter()
            .filter(|t| catalog.lookup_by_title(t).is_none())
            .count();
        if uncatalogued > 0 {
            warn!(
                "{} pivot titles have no catalog record; their results will have empty metadata",
                uncatalogued
            );
        }

        Ok(Self {
            catalog,
            model,
            popularity: PopularityTable::new(popular),
        })
    }
}

fn load_popular(resolved: &ResolvedPaths) -> Result<Vec<PopularityRow>> {
    if !resolved.popular.is_file() {
        warn!(
            "No popularity table at {:?}; the popular listing will be empty",
            resolved.popular
        );
        return Ok(Vec::new());
    }
    parser::parse_popular(&resolved.popular)
}
