//! Domain types shared by the store and the automation engine.

use serde::{Deserialize, Serialize};

/// Session outcome recorded on an attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Attended,
    Canceled,
    NoShow,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Attended => "attended",
            AttendanceStatus::Canceled => "canceled",
            AttendanceStatus::NoShow => "no_show",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attended" => Ok(AttendanceStatus::Attended),
            "canceled" => Ok(AttendanceStatus::Canceled),
            "no_show" => Ok(AttendanceStatus::NoShow),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

/// Equipment a session is booked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedType {
    Reformer,
    Cadillac,
}

impl BedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BedType::Reformer => "reformer",
            BedType::Cadillac => "cadillac",
        }
    }
}

/// Follow-up task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Follow-up task workflow state. Transitions are driven by the owner's UI,
/// never by the refresh engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
    Dismissed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Dismissed => "dismissed",
        }
    }

    /// Done and dismissed tasks are settled: the engine's upserts leave their
    /// status untouched and listings exclude them.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Dismissed)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "dismissed" => Ok(TaskStatus::Dismissed),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Resolved caller identity: the studio owner all reads and writes are
/// partitioned by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub owner_id: String,
}

/// Aggregate result of one refresh invocation.
///
/// A refresh short-circuited by the daily guard is still a success: zero
/// counts and the stored timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub generated_tasks: usize,
    pub generated_notifications: usize,
    pub refreshed_at: String,
}
