//! Whitespace tokenizer producing fixed-length id sequences.

use stepscout_core::TokenSequence;

use crate::vocab::Vocabulary;

/// Lower-case `text`, split it on whitespace runs and map each word to its
/// vocabulary id.
///
/// The result always holds exactly `max_len` ids: mapped ids first, in order,
/// then zeros. Ids are clamped into the range the model accepts.
pub fn tokenize(vocab: &Vocabulary, text: &str, max_len: usize) -> TokenSequence {
    let lowered = text.to_lowercase();
    TokenSequence::from_ids(lowered.split_whitespace().map(|w| vocab.id(w)), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use stepscout_core::MAX_SEQUENCE_LEN;
    use stepscout_core::token::{MAX_TOKEN_ID, MIN_TOKEN_ID};

    fn vocab() -> Vocabulary {
        let mut ids = HashMap::new();
        ids.insert("<OOV>".to_string(), 1);
        ids.insert("open".to_string(), 10);
        ids.insert("the".to_string(), 2);
        ids.insert("lid.".to_string(), 11);
        ids.insert("huge".to_string(), 123_456);
        ids.insert("negative".to_string(), -99_999);
        Vocabulary::from_map(ids)
    }

    #[test]
    fn maps_words_in_order_and_pads() {
        let seq = tokenize(&vocab(), "Open the lid.", MAX_SEQUENCE_LEN);
        assert_eq!(seq.len(), MAX_SEQUENCE_LEN);
        assert_eq!(&seq.ids()[..4], &[10, 2, 11, 0]);
        assert!(seq.ids()[3..].iter().all(|&id| id == 0));
    }

    #[test]
    fn unknown_words_use_oov_id() {
        let seq = tokenize(&vocab(), "Press button firmly", 5);
        assert_eq!(seq.ids(), &[1, 1, 1, 0, 0]);
    }

    #[test]
    fn splits_on_whitespace_runs() {
        let seq = tokenize(&vocab(), "  open\t\n  the   ", 4);
        assert_eq!(seq.ids(), &[10, 2, 0, 0]);
    }

    #[test]
    fn empty_text_is_all_padding() {
        let seq = tokenize(&vocab(), "   ", 8);
        assert_eq!(seq.ids(), &[0; 8]);
    }

    #[test]
    fn long_text_is_truncated() {
        let text = "open ".repeat(250);
        let seq = tokenize(&vocab(), &text, MAX_SEQUENCE_LEN);
        assert_eq!(seq.len(), MAX_SEQUENCE_LEN);
        assert!(seq.ids().iter().all(|&id| id == 10));
    }

    #[test]
    fn corrupt_ids_are_clamped() {
        let seq = tokenize(&vocab(), "huge negative", 2);
        assert_eq!(seq.ids(), &[MAX_TOKEN_ID, MIN_TOKEN_ID]);
    }

    #[test]
    fn length_and_range_hold_for_varied_inputs() {
        let long = "word ".repeat(1000);
        let inputs = [
            "",
            "one",
            "Step 1: Open the lid. Step 2: Press the button firmly.",
            "ÜBER   Straße ñandú",
            long.as_str(),
        ];
        for text in inputs {
            for max_len in [1, 10, MAX_SEQUENCE_LEN] {
                let seq = tokenize(&vocab(), text, max_len);
                assert_eq!(seq.len(), max_len);
                assert!(seq
                    .ids()
                    .iter()
                    .all(|&id| (MIN_TOKEN_ID..=MAX_TOKEN_ID).contains(&id)));
            }
        }
    }
}
