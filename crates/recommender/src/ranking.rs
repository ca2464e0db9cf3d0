//! Nearest-neighbor ranking over one similarity row.
//!
//! ## Algorithm
//! 1. Pair every position `j` with `scores[j]`
//! 2. Drop the queried row's own position (by index, not by score)
//! 3. Stable sort by score, highest first
//! 4. Keep the first `top_k`
//!
//! Stability matters: equal scores keep their original row order, so
//! `[1.0, 0.9, 0.9, 0.2]` queried from row 0 ranks row 1 before row 2.

use crate::types::Neighbor;
use data_loader::{RowIndex, Score};
use std::cmp::Ordering;

/// Rank the positions of `scores` excluding `own_position`
pub fn rank_neighbors(scores: &[Score], own_position: RowIndex, top_k: usize) -> Vec<Neighbor> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut neighbors: Vec<Neighbor> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(position, _)| position != own_position)
        .map(|(position, score)| Neighbor { position, score })
        .collect();

    // sort_by is stable
    neighbors.sort_by(|a, b| {
        sort_key(b.score)
            .partial_cmp(&sort_key(a.score))
            .unwrap_or(Ordering::Equal)
    });
    neighbors.truncate(top_k);
    neighbors
}

/// NaN ranks below every real score
fn sort_key(score: Score) -> Score {
    if score.is_nan() {
        Score::NEG_INFINITY
    } else {
        score
    }
}
