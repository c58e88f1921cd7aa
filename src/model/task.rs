use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema,
)]
pub enum TaskStatus {
    #[strum(serialize = "Belum Dikerjakan")]
    #[serde(rename = "Belum Dikerjakan")]
    NotStarted,
    #[strum(serialize = "Sedang Dicek")]
    #[serde(rename = "Sedang Dicek")]
    UnderReview,
    #[strum(serialize = "Selesai")]
    #[serde(rename = "Selesai")]
    Completed,
    #[strum(serialize = "Perlu Revisi")]
    #[serde(rename = "Perlu Revisi")]
    NeedsRevision,
}

/// Deleted tasks are kept and can be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskLifecycle {
    Active,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaskItem {
    pub id: u64,
    #[serde(skip)]
    pub task_id: u64,
    pub description: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub employee_id: u64,
    pub schedule_id: u64,
    pub created_by: u64,
    pub date_task: NaiveDate,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub message: String,
    pub feedback: String,
    pub lifecycle: TaskLifecycle,
    pub items: Vec<TaskItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub employee_id: u64,
    pub schedule_id: u64,
    pub created_by: u64,
    pub date_task: NaiveDate,
    pub deadline: NaiveDate,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCheck {
    pub item_id: u64,
    pub is_completed: bool,
}
