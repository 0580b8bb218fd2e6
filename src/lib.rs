//! Outreach CRM core: business records, an append-only outreach event log,
//! bulk sync reconciliation, funnel metrics and CSV export over SQLite,
//! gated by a shared-passphrase token scheme.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod mailer;
pub mod metrics;
pub mod model;
pub mod outreach;
pub mod slug;
pub mod sync;
