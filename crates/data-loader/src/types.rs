//! Core domain types for the book recommendation artifacts.
//!
//! This module defines the in-memory data model:
//! - `BookRecord` and the de-duplicated `Catalog` built from them
//! - `InteractionMatrix`, the title-by-rater pivot table
//! - `SimilarityMatrix`, the dense item-item score matrix
//! - `SimilarityModel`, which owns the pivot and the matrix as one value
//! - `PopularityTable`, the optional pre-sorted "most popular" listing
//!
//! Everything here is immutable once constructed. There are no mutators.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Position of a title in the pivot row order (and the similarity matrix)
pub type RowIndex = usize;

/// Similarity score between two titles
pub type Score = f32;

// =============================================================================
// Catalog Types
// =============================================================================

/// Image URL variants for a book, as found in the raw catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrls {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl ImageUrls {
    /// Non-empty variants in display preference order: medium, large, small
    pub fn by_preference(&self) -> impl Iterator<Item = &str> {
        [&self.medium, &self.large, &self.small]
            .into_iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
    }

    /// The most preferred non-empty variant, if any
    pub fn preferred(&self) -> Option<&str> {
        self.by_preference().next()
    }
}

/// One raw row of the book catalog
///
/// Several rows may share a title (different printings); see `Catalog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year_of_publication: Option<u16>,
    pub publisher: Option<String>,
    pub images: ImageUrls,
}

/// Read-only catalog keyed by title.
///
/// The first record seen for a title is its canonical record. Later rows
/// with the same title are kept in `records()` but never returned by
/// `lookup_by_title`.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<BookRecord>,
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Build the catalog, keeping the first record per title
    pub fn from_records(records: Vec<BookRecord>) -> Self {
        let mut by_title = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            by_title.entry(record.title.clone()).or_insert(pos);
        }
        Self { records, by_title }
    }

    /// Exact, case-sensitive lookup of the canonical record for a title
    pub fn lookup_by_title(&self, title: &str) -> Option<&BookRecord> {
        self.by_title.get(title).map(|&pos| &self.records[pos])
    }

    /// All raw records, duplicates included, in file order
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Number of raw records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct titles
    pub fn distinct_titles(&self) -> usize {
        self.by_title.len()
    }
}

// =============================================================================
// Interaction Matrix (Pivot Table)
// =============================================================================

/// Title-by-rater pivot table.
///
/// Row order is the order titles were enumerated when the pivot was built
/// (insertion order, not sorted). That order addresses the similarity
/// matrix, so the two only ever travel together inside `SimilarityModel`.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    titles: Vec<String>,
    raters: Vec<String>,
    /// Row-major cells, `titles.len() * raters.len()`
    cells: Vec<Option<f32>>,
    index: HashMap<String, RowIndex>,
}

impl InteractionMatrix {
    /// Build a pivot from rater column keys and `(title, cells)` rows.
    ///
    /// Fails if a title repeats or a row's width differs from the number of
    /// raters.
    pub fn new(raters: Vec<String>, rows: Vec<(String, Vec<Option<f32>>)>) -> Result<Self> {
        let mut titles = Vec::with_capacity(rows.len());
        let mut cells = Vec::with_capacity(rows.len() * raters.len());
        let mut index = HashMap::with_capacity(rows.len());

        for (title, row) in rows {
            if row.len() != raters.len() {
                return Err(DataLoadError::StructuralMismatch(format!(
                    "pivot row '{}' has {} cells but there are {} raters",
                    title,
                    row.len(),
                    raters.len()
                )));
            }
            if index.insert(title.clone(), titles.len()).is_some() {
                return Err(DataLoadError::StructuralMismatch(format!(
                    "pivot title '{}' appears more than once",
                    title
                )));
            }
            titles.push(title);
            cells.extend(row);
        }

        Ok(Self {
            titles,
            raters,
            cells,
            index,
        })
    }

    /// Exact-match position of a title in the row order
    pub fn row_index_of(&self, title: &str) -> Option<RowIndex> {
        self.index.get(title).copied()
    }

    pub fn row_count(&self) -> usize {
        self.titles.len()
    }

    /// Title at a row position
    pub fn row_key_at(&self, row: RowIndex) -> Option<&str> {
        self.titles.get(row).map(String::as_str)
    }

    /// All row keys in order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn rater_count(&self) -> usize {
        self.raters.len()
    }

    pub fn raters(&self) -> &[String] {
        &self.raters
    }

    /// Rating cell at `(row, rater column)`
    pub fn rating(&self, row: RowIndex, column: usize) -> Option<f32> {
        if row >= self.titles.len() || column >= self.raters.len() {
            return None;
        }
        self.cells[row * self.raters.len() + column]
    }

    /// Number of present ratings in a row
    pub fn ratings_in_row(&self, row: RowIndex) -> usize {
        if row >= self.titles.len() {
            return 0;
        }
        let width = self.raters.len();
        self.cells[row * width..(row + 1) * width]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }
}

// =============================================================================
// Similarity Matrix
// =============================================================================

/// Dense square matrix of precomputed item-item similarity scores
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    side: usize,
    /// Row-major, `side * side`
    scores: Vec<Score>,
}

impl SimilarityMatrix {
    /// Build from rows; every row must be `rows.len()` wide and finite
    pub fn from_rows(rows: Vec<Vec<Score>>) -> Result<Self> {
        let side = rows.len();
        let mut scores = Vec::with_capacity(side * side);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != side {
                return Err(DataLoadError::StructuralMismatch(format!(
                    "similarity row {} has {} values, expected {}",
                    i,
                    row.len(),
                    side
                )));
            }
            if let Some(j) = row.iter().position(|s| !s.is_finite()) {
                return Err(DataLoadError::InvalidValue {
                    field: format!("similarity[{}][{}]", i, j),
                    value: row[j].to_string(),
                });
            }
            scores.extend(row);
        }
        Ok(Self { side, scores })
    }

    /// Length of either axis
    pub fn side(&self) -> usize {
        self.side
    }

    /// Scores of row `i` against every column
    pub fn row(&self, i: RowIndex) -> Option<&[Score]> {
        if i >= self.side {
            return None;
        }
        Some(&self.scores[i * self.side..(i + 1) * self.side])
    }

    pub fn get(&self, i: RowIndex, j: RowIndex) -> Option<Score> {
        self.row(i).and_then(|row| row.get(j).copied())
    }
}

/// The pivot row order and the similarity matrix it addresses, as one value.
///
/// The only way to build one is `SimilarityModel::new`, which checks that
/// the matrix side equals the pivot row count. Neither half is exposed
/// mutably, so they cannot drift apart after construction.
#[derive(Debug, Clone)]
pub struct SimilarityModel {
    pivot: InteractionMatrix,
    matrix: SimilarityMatrix,
}

impl SimilarityModel {
    pub fn new(pivot: InteractionMatrix, matrix: SimilarityMatrix) -> Result<Self> {
        if matrix.side() != pivot.row_count() {
            return Err(DataLoadError::StructuralMismatch(format!(
                "similarity matrix is {0}x{0} but the pivot table has {1} rows",
                matrix.side(),
                pivot.row_count()
            )));
        }
        Ok(Self { pivot, matrix })
    }

    pub fn pivot(&self) -> &InteractionMatrix {
        &self.pivot
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn row_index_of(&self, title: &str) -> Option<RowIndex> {
        self.pivot.row_index_of(title)
    }

    pub fn row_key_at(&self, row: RowIndex) -> Option<&str> {
        self.pivot.row_key_at(row)
    }

    pub fn row_count(&self) -> usize {
        self.pivot.row_count()
    }

    /// Similarity scores for the title at `row`
    pub fn scores_for(&self, row: RowIndex) -> Option<&[Score]> {
        self.matrix.row(row)
    }
}

// =============================================================================
// Popularity Table
// =============================================================================

/// One row of the pre-sorted popularity listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityRow {
    pub title: String,
    pub author: String,
    pub avg_rating: f32,
    pub num_rating: u32,
    pub publication_year: Option<u16>,
    pub image_url: Option<String>,
}

/// Popular titles in the order the offline step sorted them
#[derive(Debug, Clone, Default)]
pub struct PopularityTable {
    rows: Vec<PopularityRow>,
}

impl PopularityTable {
    pub fn new(rows: Vec<PopularityRow>) -> Self {
        Self { rows }
    }

    /// First `n` rows; fewer if the table is shorter
    pub fn top(&self, n: usize) -> &[PopularityRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Artifacts - everything loaded at startup
// =============================================================================

/// All loaded artifacts, produced once by `Artifacts::load_from_files`
#[derive(Debug)]
pub struct Artifacts {
    pub catalog: Catalog,
    pub model: SimilarityModel,
    pub popularity: PopularityTable,
}

impl Artifacts {
    /// Counts for logging: (catalog records, pivot rows, popular rows)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.catalog.len(),
            self.model.row_count(),
            self.popularity.len(),
        )
    }
}
