//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AttendanceStatus, BedType, Priority};

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// A row from the `clients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbClient {
    pub id: String,
    pub owner_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbAttendanceRecord {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    /// Session calendar date, `%Y-%m-%d`.
    pub session_date: String,
    pub time_of_day: Option<String>,
    pub duration_minutes: Option<i64>,
    pub bed_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A row from the `payment_records` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbPaymentRecord {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    /// First of the covered month, `%Y-%m-%d`.
    pub month_start: String,
    pub lesson_count: Option<i64>,
    pub price: Option<f64>,
    pub paid: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A row from the `automation_settings` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbAutomationSettings {
    pub owner_id: String,
    pub no_show_enabled: bool,
    pub attendance_drop_enabled: bool,
    pub pending_payment_enabled: bool,
    pub no_show_threshold: i64,
    pub pending_lessons_threshold: i64,
    pub attendance_drop_ratio: f64,
    /// RFC3339 timestamp of the last completed refresh; `None` before the
    /// owner's first refresh.
    pub last_refreshed_at: Option<String>,
    pub updated_at: String,
}

/// A row from the `follow_up_tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbFollowUpTask {
    pub id: String,
    pub owner_id: String,
    pub client_id: String,
    pub rule_key: String,
    pub title: String,
    pub details: Option<String>,
    pub priority: String,
    pub status: String,
    pub due_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
    /// Joined display name; only populated by listing queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

/// A row from the `notifications` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbNotification {
    pub id: String,
    pub owner_id: String,
    pub client_id: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub body: Option<String>,
    pub created_for_date: String,
    pub is_read: bool,
    pub created_at: String,
    pub read_at: Option<String>,
}

/// Input for recording a session (written by session scheduling).
pub struct AttendanceInsert<'a> {
    pub owner_id: &'a str,
    pub client_id: &'a str,
    pub session_date: &'a str,
    pub time_of_day: Option<&'a str>,
    pub duration_minutes: Option<i64>,
    pub bed_type: BedType,
    pub status: AttendanceStatus,
    pub notes: Option<&'a str>,
}

/// Input for recording a monthly package payment row.
pub struct PaymentInsert<'a> {
    pub owner_id: &'a str,
    pub client_id: &'a str,
    pub month_start: &'a str,
    pub lesson_count: Option<i64>,
    pub price: Option<f64>,
    pub paid: bool,
    pub notes: Option<&'a str>,
}

/// Input for the follow-up task upsert, keyed on
/// `(owner_id, client_id, rule_key, due_date)`.
pub struct FollowUpTaskInsert<'a> {
    pub owner_id: &'a str,
    pub client_id: &'a str,
    pub rule_key: &'a str,
    pub title: &'a str,
    pub details: Option<&'a str>,
    pub priority: Priority,
    pub due_date: &'a str,
}

/// Input for the notification upsert, keyed on
/// `(owner_id, client_id, notification_type, created_for_date)`.
pub struct NotificationInsert<'a> {
    pub owner_id: &'a str,
    pub client_id: Option<&'a str>,
    pub notification_type: &'a str,
    pub title: &'a str,
    pub body: Option<&'a str>,
    pub created_for_date: &'a str,
}

/// Threshold/flag changes applied by the settings editor. The refresh
/// timestamp is not part of this surface; only the engine writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub no_show_enabled: bool,
    pub attendance_drop_enabled: bool,
    pub pending_payment_enabled: bool,
    pub no_show_threshold: i64,
    pub pending_lessons_threshold: i64,
    pub attendance_drop_ratio: f64,
}
