//! Result types handed to the presentation layer.

use data_loader::{RowIndex, Score};
use serde::Serialize;

/// A similar title, ready for display
///
/// `author` and `image_url` are empty strings when the catalog has no
/// record for the title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub image_url: String,
    /// Similarity to the queried title
    pub score: Score,
    /// Row position in the pivot table
    pub position: RowIndex,
}

/// A ranked row position, before metadata is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: RowIndex,
    pub score: Score,
}
