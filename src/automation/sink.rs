//! Rule-agnostic persistence of findings.
//!
//! Every finding becomes one follow-up task and one notification, both keyed
//! to the refresh calendar day. The sink runs inside the engine's
//! transaction, so the task and its notification land together or not at all.

use crate::db::{DbError, FollowUpTaskInsert, NotificationInsert, StudioDb};
use crate::error::AutomationError;

use super::rules::Finding;

/// Affected-row counts accumulated across one refresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkTotals {
    pub tasks: usize,
    pub notifications: usize,
}

/// Upsert one finding as a task plus a notification dated `due_date`.
///
/// The notification type is the finding's rule key, so the two share the
/// same natural-key shape. A uniqueness conflict the key should have
/// absorbed surfaces as `ConstraintViolation` rather than being retried or
/// dropped.
pub fn write_finding(
    db: &StudioDb,
    owner_id: &str,
    due_date: &str,
    finding: &Finding,
    totals: &mut SinkTotals,
) -> Result<(), AutomationError> {
    let tasks = db
        .upsert_task(&FollowUpTaskInsert {
            owner_id,
            client_id: &finding.client_id,
            rule_key: finding.rule_key,
            title: &finding.title,
            details: Some(&finding.detail),
            priority: finding.priority,
            due_date,
        })
        .map_err(|e| classify(e, finding))?;

    let notifications = db
        .upsert_notification(&NotificationInsert {
            owner_id,
            client_id: Some(&finding.client_id),
            notification_type: finding.rule_key,
            title: &finding.title,
            body: Some(&finding.detail),
            created_for_date: due_date,
        })
        .map_err(|e| classify(e, finding))?;

    totals.tasks += tasks;
    totals.notifications += notifications;
    Ok(())
}

fn classify(err: DbError, finding: &Finding) -> AutomationError {
    match err {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(e, msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AutomationError::ConstraintViolation {
                rule_key: finding.rule_key.to_string(),
                client_id: finding.client_id.clone(),
                source: rusqlite::Error::SqliteFailure(e, msg),
            }
        }
        other => AutomationError::Data(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
