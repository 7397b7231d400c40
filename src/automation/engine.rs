//! Refresh orchestrator.
//!
//! One refresh = one IMMEDIATE transaction: guard check, snapshot load, the
//! three rules in order, signal writes, guard timestamp. Concurrent
//! invocations for the same database serialize on SQLite's write lock, so
//! the loser of the race re-reads `last_refreshed_at` after the winner
//! committed and exits through the guard with zero counts.

use chrono::{DateTime, Duration, Local, NaiveDate};
use log::{debug, info};

use crate::db::{DbError, StudioDb};
use crate::error::AutomationError;
use crate::types::{AttendanceStatus, CallerIdentity, RefreshOutcome};

use super::rules::{fmt_date, month_bounds, rule_set, RuleSnapshot};
use super::sink::{self, SinkTotals};

/// How far back the snapshot reaches: two stacked 28-day windows.
const HISTORY_DAYS: i64 = 56;

/// Resolve the caller and run today's refresh for their studio.
///
/// This is the invocation surface: schedulers and the CLI call it on app
/// open or on a timer without checking whether a refresh already happened.
pub fn refresh_management_signals(
    db: &StudioDb,
    identity: Option<&CallerIdentity>,
) -> Result<RefreshOutcome, AutomationError> {
    let identity = identity.ok_or(AutomationError::Unauthenticated)?;
    refresh(db, &identity.owner_id, Local::now())
}

/// Run the risk rules for one owner, at most once per local calendar day.
pub fn refresh(
    db: &StudioDb,
    owner_id: &str,
    now: DateTime<Local>,
) -> Result<RefreshOutcome, AutomationError> {
    db.with_transaction(|db| {
        let settings = db.lock_settings_for_update(owner_id)?;

        // Daily guard: a refresh stamped earlier today means all signals for
        // today's data already exist.
        let today = now.date_naive();
        if let Some(stored) = settings.last_refreshed_at.as_deref() {
            if refresh_day(stored) == Some(today) {
                debug!("follow-up refresh already ran today for owner {owner_id}");
                return Ok(RefreshOutcome {
                    generated_tasks: 0,
                    generated_notifications: 0,
                    refreshed_at: stored.to_string(),
                });
            }
        }

        let snapshot = load_snapshot(db, owner_id, today)?;
        debug!(
            "snapshot for owner {owner_id}: {} active client(s), {} no-show(s), {} attended, {} payment row(s)",
            snapshot.clients.len(),
            snapshot.no_shows.len(),
            snapshot.attended.len(),
            snapshot.month_payments.len()
        );

        let due_date = fmt_date(today);
        let mut totals = SinkTotals::default();
        for entry in rule_set() {
            if !(entry.enabled)(&settings) {
                debug!("rule {} disabled for owner {owner_id}", entry.key);
                continue;
            }
            let findings = (entry.rule)(&snapshot, &settings);
            debug!("rule {} produced {} finding(s)", entry.key, findings.len());
            for finding in &findings {
                sink::write_finding(db, owner_id, &due_date, finding, &mut totals)?;
            }
        }

        let refreshed_at = now.to_rfc3339();
        db.save_settings_timestamp(owner_id, &refreshed_at)?;

        info!(
            "follow-up refresh for owner {owner_id}: {} task(s), {} notification(s)",
            totals.tasks, totals.notifications
        );

        Ok(RefreshOutcome {
            generated_tasks: totals.tasks,
            generated_notifications: totals.notifications,
            refreshed_at,
        })
    })
}

/// Local calendar day a stored refresh timestamp falls on. A timestamp that
/// does not parse reads as "never refreshed", so the refresh runs.
fn refresh_day(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Fetch everything the rules look at in four reads. The attendance reach is
/// the longer of the two stacked windows and the current month.
fn load_snapshot(db: &StudioDb, owner_id: &str, today: NaiveDate) -> Result<RuleSnapshot, DbError> {
    let (month_start, next_month_start) = month_bounds(today);
    let history_start = fmt_date(today - Duration::days(HISTORY_DAYS));
    let month_end = fmt_date(next_month_start - Duration::days(1));
    let today_s = fmt_date(today);
    let month_start_s = fmt_date(month_start);

    Ok(RuleSnapshot {
        today,
        clients: db.list_active_clients(owner_id)?,
        no_shows: db.list_attendance(
            owner_id,
            &history_start,
            &today_s,
            Some(AttendanceStatus::NoShow),
        )?,
        attended: db.list_attendance(
            owner_id,
            &history_start,
            &month_end,
            Some(AttendanceStatus::Attended),
        )?,
        month_payments: db.list_payments_for_month(owner_id, &month_start_s)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
