//! Cover image planning.
//!
//! Fetching and decoding images belongs to an external collaborator, the
//! `CoverResolver`. This module only decides *which* URLs to try, in what
//! order, and what the placeholder says when none of them work:
//! 1. the catalog image variants, medium then large then small
//! 2. the Open Library cover for the ISBN
//! 3. a placeholder captioned with the word-wrapped title

use data_loader::{BookRecord, PopularityRow};

const OPEN_LIBRARY_COVER: &str = "https://covers.openlibrary.org/b/isbn";
const CAPTION_MAX_CHARS: usize = 100;
const CAPTION_LINE_WIDTH: usize = 16;
const CAPTION_MAX_LINES: usize = 5;

/// Rewrite a raw catalog image URL into a fetchable https URL
///
/// Returns `None` for blank input.
pub fn normalize_image_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let url = if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    };

    // Legacy Amazon host has no https endpoint
    Some(url.replace(
        "images.amazon.com/images/P/",
        "images-na.ssl-images-amazon.com/images/P/",
    ))
}

/// Open Library cover URL for an ISBN, hyphens stripped
pub fn open_library_url(isbn: &str) -> Option<String> {
    let isbn: String = isbn.trim().chars().filter(|&c| c != '-').collect();
    if isbn.is_empty() {
        return None;
    }
    Some(format!("{}/{}-M.jpg?default=false", OPEN_LIBRARY_COVER, isbn))
}

/// Candidate URLs for a catalog record, in the order they should be tried
pub fn cover_candidates(record: &BookRecord) -> Vec<String> {
    let mut candidates: Vec<String> = record
        .images
        .by_preference()
        .filter_map(normalize_image_url)
        .collect();
    candidates.extend(open_library_url(&record.isbn));
    candidates
}

/// Caption lines drawn on a placeholder cover
///
/// Greedy word wrap of the (truncated) title; "No Cover" for a blank title.
pub fn placeholder_caption(title: &str) -> Vec<String> {
    let title = title.trim();
    let text: String = if title.is_empty() {
        "No Cover".to_string()
    } else {
        title.chars().take(CAPTION_MAX_CHARS).collect()
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let joined_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if joined_len <= CAPTION_LINE_WIDTH {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.truncate(CAPTION_MAX_LINES);
    lines
}

/// What to try for one cover, and what to show if nothing works
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverRequest {
    pub title: String,
    pub candidates: Vec<String>,
}

impl CoverRequest {
    pub fn for_record(record: &BookRecord) -> Self {
        Self {
            title: record.title.clone(),
            candidates: cover_candidates(record),
        }
    }

    /// A popularity row only carries its own image URL
    pub fn for_popular(row: &PopularityRow) -> Self {
        Self {
            title: row.title.clone(),
            candidates: row
                .image_url
                .as_deref()
                .and_then(normalize_image_url)
                .into_iter()
                .collect(),
        }
    }

    /// No candidates; resolves straight to a placeholder
    pub fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            candidates: Vec::new(),
        }
    }
}

/// A resolved cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cover {
    /// Raw image bytes as returned by the resolver
    Image { url: String, bytes: Vec<u8> },
    /// Caption lines for a generated placeholder
    Placeholder(Vec<String>),
}

/// External image fetcher.
///
/// Implementors provide `fetch`; timeouts, retries and caching are theirs.
/// `resolve` walks the candidates in order and falls back to a placeholder.
pub trait CoverResolver: Send + Sync {
    /// Image bytes for a URL, or `None` if it isn't a usable image
    fn fetch(&self, url: &str) -> Option<Vec<u8>>;

    fn resolve(&self, request: &CoverRequest) -> Cover {
        request
            .candidates
            .iter()
            .find_map(|url| {
                self.fetch(url).map(|bytes| Cover::Image {
                    url: url.clone(),
                    bytes,
                })
            })
            .unwrap_or_else(|| Cover::Placeholder(placeholder_caption(&request.title)))
    }
}
