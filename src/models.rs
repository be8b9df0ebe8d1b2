//! Frontend Models
//!
//! Data structures matching the backend's JSON contract, plus the
//! identifiers that bind page controls to backend tasks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Backend task identifier, kept opaque (the server owns the format)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which kind of control a task reference is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    StatusCheckbox,
    PrioritySelect,
}

static NEXT_CONTROL: AtomicU64 = AtomicU64::new(1);

/// One rendered control bound to one backend task.
///
/// Every constructor call yields a distinct reference, so two controls
/// rendered for the same task never share one. Clones share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskRef {
    pub task_id: TaskId,
    pub kind: ControlKind,
    control: u64,
}

impl TaskRef {
    fn bind(task_id: TaskId, kind: ControlKind) -> Self {
        let control = NEXT_CONTROL.fetch_add(1, Ordering::Relaxed);
        Self { task_id, kind, control }
    }

    pub fn status(task_id: TaskId) -> Self {
        Self::bind(task_id, ControlKind::StatusCheckbox)
    }

    pub fn priority(task_id: TaskId) -> Self {
        Self::bind(task_id, ControlKind::PrioritySelect)
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ControlKind::StatusCheckbox => write!(f, "task {} (status)", self.task_id),
            ControlKind::PrioritySelect => write!(f, "task {} (priority)", self.task_id),
        }
    }
}

/// Task priority (matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// Badge text, e.g. "High"
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }

    /// Full class attribute of the priority badge
    pub fn badge_class(&self) -> String {
        format!("badge priority-{}", self.as_str())
    }
}

/// Status string reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(pub String);

impl TaskStatus {
    /// Only "completed" renders as a checked box
    pub fn is_completed(&self) -> bool {
        self.0 == "completed"
    }
}

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

// ========================
// API Responses
// ========================

/// `POST /api/tasks/{id}/toggle-status`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToggleStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub points_earned: Option<i64>,
}

impl ToggleStatusResponse {
    /// Bonus points worth animating, if any
    pub fn reward(&self) -> Option<u32> {
        self.points_earned
            .filter(|p| *p > 0)
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
    }
}

/// `POST /api/tasks/{id}/update-priority`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriorityResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct UpdatePriorityArgs {
    pub priority: Priority,
}

/// `GET /api/user/stats`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserStatsResponse {
    pub success: bool,
    #[serde(default)]
    pub stats: Option<UserStats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserStats {
    pub total_points: i64,
    #[serde(default)]
    pub progress_percentage: f64,
}

/// `GET /api/dashboard-stats`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub weekly_stats: Vec<DailyHours>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyHours {
    pub date: String,
    pub hours: f64,
}

/// One row of `GET /api/analytics/chart-data?type=subjects`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectHours {
    pub subject: String,
    pub hours: f64,
}
