//! Risk rule evaluators for the follow-up refresh.
//!
//! Each rule is a pure function over a pre-fetched `RuleSnapshot`: the
//! orchestrator loads the attendance and payment windows once, and rules do
//! their window arithmetic in memory. No rule touches the database, which
//! keeps the boundary conditions testable without one.

use chrono::{Datelike, Duration, NaiveDate};

use crate::db::{DbAttendanceRecord, DbAutomationSettings, DbClient, DbPaymentRecord};
use crate::types::Priority;

pub const RULE_NO_SHOW: &str = "no_show_risk";
pub const RULE_ATTENDANCE_DROP: &str = "attendance_drop";
pub const RULE_PENDING_PAYMENT: &str = "pending_payment_risk";

/// Rolling window length shared by the no-show and attendance-drop rules.
const WINDOW_DAYS: i64 = 28;

/// Everything a rule may look at, fetched once per refresh.
pub struct RuleSnapshot {
    pub today: NaiveDate,
    /// Active clients for the owner.
    pub clients: Vec<DbClient>,
    /// status = no_show, covering at least the last 28 days.
    pub no_shows: Vec<DbAttendanceRecord>,
    /// status = attended, covering at least today-56 through month end.
    pub attended: Vec<DbAttendanceRecord>,
    /// Payment rows for the current month.
    pub month_payments: Vec<DbPaymentRecord>,
}

/// One per-client risk emitted by a rule. A rule emits at most one finding
/// per client per run.
#[derive(Debug, Clone)]
pub struct Finding {
    pub client_id: String,
    pub rule_key: &'static str,
    pub priority: Priority,
    pub title: String,
    pub detail: String,
}

/// Function signature for a risk rule.
pub type RuleFn = fn(&RuleSnapshot, &DbAutomationSettings) -> Vec<Finding>;

/// A registered rule with its per-owner enabled flag accessor.
pub struct RuleEntry {
    pub key: &'static str,
    pub enabled: fn(&DbAutomationSettings) -> bool,
    pub rule: RuleFn,
}

/// The three rules in evaluation order.
pub fn rule_set() -> Vec<RuleEntry> {
    vec![
        RuleEntry {
            key: RULE_NO_SHOW,
            enabled: |s| s.no_show_enabled,
            rule: no_show_risk,
        },
        RuleEntry {
            key: RULE_ATTENDANCE_DROP,
            enabled: |s| s.attendance_drop_enabled,
            rule: attendance_drop,
        },
        RuleEntry {
            key: RULE_PENDING_PAYMENT,
            enabled: |s| s.pending_payment_enabled,
            rule: pending_payment_risk,
        },
    ]
}

// ---------------------------------------------------------------------------
// Rule 1: No-show risk
// ---------------------------------------------------------------------------

/// Active client with >= threshold no-shows in the last 28 days (inclusive
/// of both window edges).
pub fn no_show_risk(snapshot: &RuleSnapshot, settings: &DbAutomationSettings) -> Vec<Finding> {
    let window_start = fmt_date(snapshot.today - Duration::days(WINDOW_DAYS));
    let today = fmt_date(snapshot.today);

    let mut findings = Vec::new();
    for client in &snapshot.clients {
        let count = snapshot
            .no_shows
            .iter()
            .filter(|r| {
                r.client_id == client.id
                    && r.session_date.as_str() >= window_start.as_str()
                    && r.session_date.as_str() <= today.as_str()
            })
            .count() as i64;

        if count >= settings.no_show_threshold {
            findings.push(Finding {
                client_id: client.id.clone(),
                rule_key: RULE_NO_SHOW,
                priority: Priority::High,
                title: format!("Check in with {}", client.full_name),
                detail: format!(
                    "{} missed {} session{} without notice in the last 4 weeks.",
                    client.full_name,
                    count,
                    if count == 1 { "" } else { "s" }
                ),
            });
        }
    }
    findings
}

// ---------------------------------------------------------------------------
// Rule 2: Attendance drop
// ---------------------------------------------------------------------------

/// Active client whose attended count in the last 28 days fell to
/// floor(previous * ratio) or below, where previous covers [today-56,
/// today-28). Clients with a zero baseline are never flagged.
pub fn attendance_drop(snapshot: &RuleSnapshot, settings: &DbAutomationSettings) -> Vec<Finding> {
    let recent_start = fmt_date(snapshot.today - Duration::days(WINDOW_DAYS));
    let previous_start = fmt_date(snapshot.today - Duration::days(2 * WINDOW_DAYS));
    let today = fmt_date(snapshot.today);

    let mut findings = Vec::new();
    for client in &snapshot.clients {
        let mut recent = 0i64;
        let mut previous = 0i64;
        for record in &snapshot.attended {
            if record.client_id != client.id {
                continue;
            }
            let date = record.session_date.as_str();
            if date >= recent_start.as_str() && date <= today.as_str() {
                recent += 1;
            } else if date >= previous_start.as_str() && date < recent_start.as_str() {
                previous += 1;
            }
        }

        if previous == 0 {
            continue;
        }
        let cutoff = (previous as f64 * settings.attendance_drop_ratio).floor() as i64;
        if recent <= cutoff {
            findings.push(Finding {
                client_id: client.id.clone(),
                rule_key: RULE_ATTENDANCE_DROP,
                priority: Priority::Medium,
                title: format!("Attendance drop for {}", client.full_name),
                detail: format!(
                    "{} attended {} session{} in the last 4 weeks, down from {} in the 4 weeks before.",
                    client.full_name,
                    recent,
                    if recent == 1 { "" } else { "s" },
                    previous
                ),
            });
        }
    }
    findings
}

// ---------------------------------------------------------------------------
// Rule 3: Pending payment risk
// ---------------------------------------------------------------------------

/// Unpaid current-month package where lesson_count minus this month's
/// attended sessions is at or above the threshold. Driven by the payment
/// rows, not the active client list; rows without a lesson count have
/// nothing pending.
pub fn pending_payment_risk(
    snapshot: &RuleSnapshot,
    settings: &DbAutomationSettings,
) -> Vec<Finding> {
    let (month_start, next_month_start) = month_bounds(snapshot.today);
    let month_start = fmt_date(month_start);
    let next_month_start = fmt_date(next_month_start);

    let mut findings = Vec::new();
    for payment in &snapshot.month_payments {
        if payment.paid || payment.month_start != month_start {
            continue;
        }
        let Some(lesson_count) = payment.lesson_count else {
            continue;
        };

        let attended_this_month = snapshot
            .attended
            .iter()
            .filter(|r| {
                r.client_id == payment.client_id
                    && r.session_date.as_str() >= month_start.as_str()
                    && r.session_date.as_str() < next_month_start.as_str()
            })
            .count() as i64;

        let pending = (lesson_count - attended_this_month).max(0);
        if pending >= settings.pending_lessons_threshold {
            let name = client_display_name(snapshot, &payment.client_id);
            findings.push(Finding {
                client_id: payment.client_id.clone(),
                rule_key: RULE_PENDING_PAYMENT,
                priority: Priority::Medium,
                title: format!("Unpaid package for {name}"),
                detail: format!(
                    "{pending} of {lesson_count} lessons still pending this month and the package is unpaid."
                ),
            });
        }
    }
    findings
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First of `today`'s month and first of the following month. Derived by
/// day arithmetic so the computation is total.
pub(crate) fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let month_start = today - Duration::days(i64::from(today.day()) - 1);
    // 32 days past the 1st always lands inside the next month.
    let inside_next = month_start + Duration::days(32);
    let next_month_start = inside_next - Duration::days(i64::from(inside_next.day()) - 1);
    (month_start, next_month_start)
}

/// Payment rows can reference deactivated clients; fall back to the id when
/// the snapshot has no name for one.
fn client_display_name<'a>(snapshot: &'a RuleSnapshot, client_id: &'a str) -> &'a str {
    snapshot
        .clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.full_name.as_str())
        .unwrap_or(client_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
