//! # Data Loader Crate
//!
//! This crate loads the precomputed BookVault artifacts and exposes them as
//! immutable in-memory structures.
//!
//! ## Main Components
//!
//! - **types**: Catalog, pivot table, similarity matrix and popularity table
//! - **parser**: Parse the `.dat` artifact files into Rust structs
//! - **index**: One-time loading and validation (`Artifacts::load_from_files`)
//! - **config**: Artifact file names
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ArtifactPaths, Artifacts};
//! use std::path::Path;
//!
//! let artifacts = Artifacts::load_from_files(
//!     Path::new("data/book-crossing"),
//!     &ArtifactPaths::default(),
//! )?;
//!
//! let row = artifacts.model.row_index_of("The Da Vinci Code");
//! let book = artifacts.catalog.lookup_by_title("The Da Vinci Code");
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use config::{ArtifactPaths, ResolvedPaths};
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    RowIndex,
    Score,
    // Core types
    Artifacts,
    BookRecord,
    Catalog,
    ImageUrls,
    InteractionMatrix,
    PopularityRow,
    PopularityTable,
    SimilarityMatrix,
    SimilarityModel,
};
