//! Word → id vocabulary loaded from a JSON object.

use std::collections::HashMap;
use std::path::Path;

use stepscout_core::error::ModelError;

/// Key of the reserved out-of-vocabulary entry.
pub const OOV_TOKEN: &str = "<OOV>";

/// Id used for unknown words when the vocabulary has no `<OOV>` entry.
pub const DEFAULT_OOV_ID: i64 = 1;

/// An immutable word → id mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    ids: HashMap<String, i64>,
    oov_id: i64,
}

impl Vocabulary {
    pub fn from_map(ids: HashMap<String, i64>) -> Self {
        let oov_id = ids.get(OOV_TOKEN).copied().unwrap_or(DEFAULT_OOV_ID);
        Self { ids, oov_id }
    }

    /// Parse a JSON object of `word: id` pairs.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let ids: HashMap<String, i64> = serde_json::from_str(json)
            .map_err(|e| ModelError::LoadFailed(format!("Invalid vocabulary JSON: {e}")))?;
        Ok(Self::from_map(ids))
    }

    pub async fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ModelError::LoadFailed(format!(
                "Failed to read vocabulary {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Id of `word`, or the out-of-vocabulary id.
    pub fn id(&self, word: &str) -> i64 {
        self.ids.get(word).copied().unwrap_or(self.oov_id)
    }

    pub fn oov_id(&self) -> i64 {
        self.oov_id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
