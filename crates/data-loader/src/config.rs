//! Where the artifact files live.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names of the precomputed artifacts, relative to a data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub books: PathBuf,
    pub pivot: PathBuf,
    pub similarity: PathBuf,
    /// Optional; a missing file yields an empty popularity table
    pub popular: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            books: PathBuf::from("books.dat"),
            pivot: PathBuf::from("pt.dat"),
            similarity: PathBuf::from("similarity.dat"),
            popular: PathBuf::from("popular.dat"),
        }
    }
}

impl ArtifactPaths {
    pub fn with_books(mut self, path: impl Into<PathBuf>) -> Self {
        self.books = path.into();
        self
    }

    pub fn with_pivot(mut self, path: impl Into<PathBuf>) -> Self {
        self.pivot = path.into();
        self
    }

    pub fn with_similarity(mut self, path: impl Into<PathBuf>) -> Self {
        self.similarity = path.into();
        self
    }

    pub fn with_popular(mut self, path: impl Into<PathBuf>) -> Self {
        self.popular = path.into();
        self
    }

    /// Resolve every path against `data_dir` (absolute paths are kept as is)
    pub fn resolve(&self, data_dir: &Path) -> ResolvedPaths {
        ResolvedPaths {
            books: data_dir.join(&self.books),
            pivot: data_dir.join(&self.pivot),
            similarity: data_dir.join(&self.similarity),
            popular: data_dir.join(&self.popular),
        }
    }
}

/// Absolute (or cwd-relative) artifact paths ready to open
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub books: PathBuf,
    pub pivot: PathBuf,
    pub similarity: PathBuf,
    pub popular: PathBuf,
}

impl ResolvedPaths {
    /// Display names of the required files that do not exist
    pub fn missing_required(&self) -> Vec<String> {
        [&self.books, &self.pivot, &self.similarity]
            .into_iter()
            .filter(|p| !p.is_file())
            .map(|p| display_name(p))
            .collect()
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
