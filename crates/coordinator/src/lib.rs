//! # StepScout Coordinator
//!
//! The two halves of the extension, modelled as plain async Rust:
//! - [`PageContext`]: one per tab, owns the page document and its panel
//! - [`Coordinator`]: the background, reacting to browser events and to
//!   reports from page contexts
//!
//! They talk through typed messages ([`ContentRequest`], [`ContentResponse`],
//! [`Envelope`]) over a [`PageChannel`].

pub mod background;
pub mod channel;
pub mod gate;
pub mod messages;
pub mod notifier;
pub mod page;
pub mod panel;

pub use background::{
    Coordinator, CoordinatorEvent, NOTIFICATION_ID, NotificationSettings, TabState,
    forward_outbox,
};
pub use channel::{LocalPageChannel, PageChannel};
pub use gate::{GateGuard, InFlightGate};
pub use messages::{BackgroundMessage, ContentRequest, ContentResponse, Envelope};
pub use notifier::LogNotifier;
pub use page::{PageContext, PageServices};
pub use panel::{BlockLine, ConfidenceBand, EnrichmentView, PanelReport, PanelState, PanelView};
