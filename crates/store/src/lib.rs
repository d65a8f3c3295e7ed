//! Persistent state for StepScout.
//!
//! Two concerns live here:
//! - the verdict cache ([`VerdictStore`](stepscout_core::VerdictStore)),
//!   file-backed or in-memory
//! - per-installation [`Preferences`](stepscout_core::Preferences): the
//!   installation id and the notification opt-out

pub mod file_backend;
pub mod in_memory;
pub mod preferences;

pub use file_backend::FileVerdictStore;
pub use in_memory::InMemoryVerdictStore;
pub use preferences::{FilePreferences, InMemoryPreferences};
