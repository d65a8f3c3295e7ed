//! Fixed-length token id sequences fed to the local classifier.

use serde::{Deserialize, Serialize};

/// Length of every sequence the classifier accepts.
pub const MAX_SEQUENCE_LEN: usize = 100;

/// Lowest id a sequence may carry.
pub const MIN_TOKEN_ID: i32 = -10_000;

/// Highest id a sequence may carry.
pub const MAX_TOKEN_ID: i32 = 9_999;

/// A zero-padded sequence of vocabulary ids.
///
/// Ids are clamped into `[MIN_TOKEN_ID, MAX_TOKEN_ID]` on construction, so
/// every value is exactly representable as an `f32`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence(Vec<i32>);

impl TokenSequence {
    /// Build a sequence of exactly `len` ids from `ids`.
    ///
    /// Extra ids are dropped, missing positions are filled with 0.
    pub fn from_ids(ids: impl IntoIterator<Item = i64>, len: usize) -> Self {
        let mut padded: Vec<i32> = ids
            .into_iter()
            .take(len)
            .map(|id| id.clamp(MIN_TOKEN_ID as i64, MAX_TOKEN_ID as i64) as i32)
            .collect();
        padded.resize(len, 0);
        Self(padded)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[i32] {
        &self.0
    }

    /// Float-encoded ids, the input layout the model expects.
    pub fn as_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&id| id as f32).collect()
    }
}
