//! Follow-up automation engine for a single-studio fitness practice.
//!
//! Tracks clients, monthly lesson packages, and per-session attendance in
//! SQLite, and derives daily follow-up work from three risk rules: no-show
//! streaks, attendance drops, and unpaid packages with lessons still
//! pending. Each rule finding becomes a follow-up task plus a notification,
//! deduplicated per (owner, client, rule, day) so the refresh can run on
//! every app open without piling up duplicates.

pub mod automation;
pub mod config;
pub mod db;
pub mod error;
mod migrations;
pub mod types;
