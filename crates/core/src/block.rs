//! Text blocks: the unit of local scoring.

use serde::{Deserialize, Serialize};

/// A block whose confidence reaches this value counts as a match.
pub const MATCH_THRESHOLD: f64 = 0.1;

/// Minimum character length of a scoreable block.
const MIN_BLOCK_CHARS: usize = 20;

/// Minimum share of `[A-Za-z0-9 ]` characters in a scoreable block.
const MIN_ALNUM_RATIO: f64 = 0.7;

/// Which kind of element a block was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    ListItem,
    TableCell,
    Heading { level: u8 },
}

/// A candidate unit of analysis: one text-bearing element of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl TextBlock {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A paragraph block, mostly useful in tests and ad-hoc scoring.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    /// Whether the block looks like prose rather than navigation or decoration.
    pub fn is_valid(&self) -> bool {
        is_valid_text(&self.text)
    }
}

/// Validity filter for block text.
///
/// Requires at least 20 characters, an ASCII letter, some whitespace, and
/// at least 70% of characters drawn from `[A-Za-z0-9 ]`.
pub fn is_valid_text(text: &str) -> bool {
    let total = text.chars().count();
    if total < MIN_BLOCK_CHARS {
        return false;
    }
    if !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !text.chars().any(char::is_whitespace) {
        return false;
    }
    let kept = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .count();
    kept as f64 / total as f64 >= MIN_ALNUM_RATIO
}

/// A block paired with its mean sentence confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockScore {
    pub block: TextBlock,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl BlockScore {
    pub fn new(block: TextBlock, confidence: f64) -> Self {
        Self { block, confidence }
    }

    pub fn is_match(&self) -> bool {
        self.confidence >= MATCH_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_sentence() {
        assert!(is_valid_text("Preheat the oven to 200 degrees before baking"));
    }

    #[test]
    fn rejects_short_text() {
        assert!(!is_valid_text("Click here now"));
    }

    #[test]
    fn rejects_text_without_letters() {
        assert!(!is_valid_text("12345 67890 12345 67890"));
    }

    #[test]
    fn rejects_text_without_whitespace() {
        assert!(!is_valid_text("https://example.com/some/long/path"));
    }

    #[test]
    fn rejects_symbol_heavy_text() {
        // 11 alphanumeric-or-space chars out of 20
        assert!(!is_valid_text("a|b|c|d|e|f|g|h|i j|"));
    }

    #[test]
    fn ratio_boundary_is_inclusive() {
        // 14 of 20 chars are letters or spaces: exactly 0.7
        let text = "abcd efgh ijkl-----.";
        assert_eq!(text.chars().count(), 20);
        assert!(is_valid_text(text));
    }

    #[test]
    fn match_threshold_is_inclusive() {
        assert!(BlockScore::new(TextBlock::paragraph("x"), 0.1).is_match());
        assert!(!BlockScore::new(TextBlock::paragraph("x"), 0.099).is_match());
    }
}
