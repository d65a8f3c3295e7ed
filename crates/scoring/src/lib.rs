//! Page scoring pipeline.
//!
//! HTML goes in through [`PageDocument::parse`], which extracts the candidate
//! text blocks. [`BlockScorer`] splits each block into sentences and averages
//! the classifier's confidence over them, and [`aggregate`] turns the block
//! scores into a [`PageAnalysis`](stepscout_core::PageAnalysis) with a tier.

pub mod aggregate;
pub mod page;
pub mod scorer;
pub mod sentences;

pub use aggregate::aggregate;
pub use page::{PageDocument, SkipReason, SkipRules};
pub use scorer::BlockScorer;
pub use sentences::split_sentences;
