//! Page documents: the text a page context exposes to the scorer.
//!
//! The HTML is parsed once and reduced to owned strings, so a document can
//! be shared across tasks and threads. Block and content text is the raw
//! element text, trimmed but otherwise untouched, so indentation counts
//! against the validity filter and toward the content length.

use std::sync::LazyLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use stepscout_config::ScanConfig;
use stepscout_core::{BlockKind, TextBlock};
use tracing::debug;

struct PageSelectors {
    title: Selector,
    blocks: Selector,
    main: Selector,
    body: Selector,
    page_text: Selector,
}

static SELECTORS: LazyLock<PageSelectors> = LazyLock::new(|| PageSelectors {
    title: Selector::parse("title").expect("title selector"),
    blocks: Selector::parse("p, li, td, h1, h2, h3, h4, h5").expect("block selector"),
    main: Selector::parse(r#"main, article, [role="main"]"#).expect("main selector"),
    body: Selector::parse("body").expect("body selector"),
    page_text: Selector::parse("h1, h2, h3, h4, h5, p, li, td, caption, a")
        .expect("page text selector"),
});

/// A parsed page, reduced to the text views the pipeline needs.
#[derive(Debug, Clone)]
pub struct PageDocument {
    url: String,
    title: String,
    blocks: Vec<TextBlock>,
    main_content_len: usize,
    page_text: String,
}

impl PageDocument {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        let url = url.into();
        let document = Html::parse_document(html);
        let selectors = &*SELECTORS;

        let title = document
            .select(&selectors.title)
            .next()
            .map(|el| collapsed_text(&el))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| url.clone());

        let blocks: Vec<TextBlock> = document
            .select(&selectors.blocks)
            .filter_map(|el| {
                let kind = block_kind(el.value().name())?;
                Some(TextBlock::new(kind, trimmed_text(&el)))
            })
            .collect();

        let main_content_len = document
            .select(&selectors.main)
            .next()
            .or_else(|| document.select(&selectors.body).next())
            .map(|el| trimmed_text(&el).chars().count())
            .unwrap_or(0);

        let page_text = document
            .select(&selectors.page_text)
            .map(|el| trimmed_text(&el))
            .collect::<Vec<_>>()
            .join(" ");

        debug!(
            url = %url,
            blocks = blocks.len(),
            main_content_len,
            "Parsed page document"
        );

        Self {
            url,
            title,
            blocks,
            main_content_len,
            page_text,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `<title>` text, or the URL when the page has none.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Scoreable blocks in document order. Blocks failing the validity
    /// filter are left out.
    pub fn candidate_blocks(&self) -> Vec<TextBlock> {
        self.blocks.iter().filter(|b| b.is_valid()).cloned().collect()
    }

    /// Character length of the main content region (`main`, `article` or
    /// `[role="main"]`), falling back to `<body>`.
    pub fn main_content_len(&self) -> usize {
        self.main_content_len
    }

    /// Non-empty heading, paragraph, list and cell texts, one per line.
    pub fn enrichment_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.text.is_empty())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Visible text of headings, paragraphs, list items, cells, captions
    /// and links, joined with spaces.
    pub fn page_text(&self) -> &str {
        &self.page_text
    }
}

fn block_kind(tag: &str) -> Option<BlockKind> {
    match tag {
        "p" => Some(BlockKind::Paragraph),
        "li" => Some(BlockKind::ListItem),
        "td" => Some(BlockKind::TableCell),
        "h1" => Some(BlockKind::Heading { level: 1 }),
        "h2" => Some(BlockKind::Heading { level: 2 }),
        "h3" => Some(BlockKind::Heading { level: 3 }),
        "h4" => Some(BlockKind::Heading { level: 4 }),
        "h5" => Some(BlockKind::Heading { level: 5 }),
        _ => None,
    }
}

/// Concatenated text nodes of `element`, trimmed at both ends.
fn trimmed_text(element: &ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.trim().to_string()
}

/// Element text with whitespace runs collapsed to single spaces and trimmed.
fn collapsed_text(element: &ElementRef<'_>) -> String {
    let mut buf = String::new();
    let mut pending_space = false;
    for ch in element.text().flat_map(str::chars) {
        if ch.is_whitespace() {
            pending_space = !buf.is_empty();
        } else {
            if pending_space {
                buf.push(' ');
                pending_space = false;
            }
            buf.push(ch);
        }
    }
    buf
}

/// Why a page produced no verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The URL belongs to an app or feed rather than an article.
    NonContentUrl,
    /// The main content region is too short to be worth scoring.
    MinimalContent,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NonContentUrl => "non-content URL",
            SkipReason::MinimalContent => "minimal content",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which pages are not worth analyzing.
#[derive(Debug, Clone)]
pub struct SkipRules {
    patterns: Vec<Regex>,
    min_content_chars: usize,
}

impl SkipRules {
    pub fn new<S: AsRef<str>>(
        patterns: &[S],
        min_content_chars: usize,
    ) -> Result<Self, regex_lite::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            min_content_chars,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self, regex_lite::Error> {
        Self::new(&config.skip_patterns, config.min_content_chars)
    }

    /// Rules that never skip a page.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
            min_content_chars: 0,
        }
    }

    pub fn is_non_content_url(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    /// The reason to skip `page`, if any. URL rules are checked first.
    pub fn check(&self, page: &PageDocument) -> Option<SkipReason> {
        if self.is_non_content_url(page.url()) {
            return Some(SkipReason::NonContentUrl);
        }
        if page.main_content_len() < self.min_content_chars {
            return Some(SkipReason::MinimalContent);
        }
        None
    }
}
