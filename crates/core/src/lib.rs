//! # StepScout Core
//!
//! Domain types, traits, and error definitions for the StepScout
//! instruction detector. This crate has **no inference, HTML or HTTP
//! dependencies**: it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every seam with the outside world is a trait here:
//! - [`SentenceModel`]: one forward pass of the local classifier
//! - [`VerdictStore`] / [`Preferences`]: persisted state
//! - [`Notifier`]: transient user notifications
//!
//! Implementations live in their respective crates, so the scoring and
//! coordination logic can be tested with stubs.

pub mod block;
pub mod error;
pub mod event;
pub mod model;
pub mod notify;
pub mod store;
pub mod token;
pub mod verdict;

// Re-export key types at crate root for ergonomics
pub use block::{BlockKind, BlockScore, TextBlock, MATCH_THRESHOLD};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus, TabId};
pub use model::SentenceModel;
pub use notify::{Notification, Notifier};
pub use store::{Preferences, VerdictStore};
pub use token::{TokenSequence, MAX_SEQUENCE_LEN};
pub use verdict::{PageAnalysis, PageVerdict, Tier};
