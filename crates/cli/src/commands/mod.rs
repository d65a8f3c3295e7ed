pub mod cache;
pub mod enrich;
pub mod notifications;
pub mod onboard;
pub mod open;
pub mod scan;
pub mod status;
