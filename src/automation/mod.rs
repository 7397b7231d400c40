//! Follow-up automation for the studio.
//!
//! Scans attendance and payment history for risk patterns (no-show streaks,
//! attendance drops, unpaid packages) and turns them into follow-up tasks
//! and notifications, at most once per owner per day.

pub mod engine;
pub mod rules;
pub mod sink;

pub use engine::{refresh, refresh_management_signals};
