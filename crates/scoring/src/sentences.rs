//! Sentence splitting for block scoring.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Whitespace as HTML text sees it. `regex_lite` only knows ASCII `\s`, so
/// the Unicode spaces (`&nbsp;` and friends) are listed explicitly.
const WHITESPACE: &str =
    "\\s\u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}\u{feff}";

/// Terminal punctuation followed by whitespace.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[.!?][{WHITESPACE}]+")).expect("sentence boundary pattern is valid")
});

/// Split `text` after every `.`, `!` or `?` that is followed by whitespace.
///
/// The punctuation stays with its sentence. Fragments are trimmed and empty
/// ones are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in BOUNDARY.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        let end = boundary.start() + 1;
        push_trimmed(&mut sentences, &text[start..end]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if !fragment.is_empty() {
        out.push(fragment);
    }
}
