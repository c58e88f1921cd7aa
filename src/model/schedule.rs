use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Default schedule status ("present").
pub const DEFAULT_SCHEDULE_STATUS: &str = "hadir";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub id: u64,
    pub employee_id: u64,
    pub shift_id: u64,
    pub created_by: u64,
    pub date_schedule: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub employee_id: u64,
    pub shift_id: u64,
    pub created_by: u64,
    pub date_schedule: NaiveDate,
    pub status: String,
}

/// Columns an update may touch; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleChanges {
    pub shift_id: Option<u64>,
    pub date_schedule: Option<NaiveDate>,
    pub status: Option<String>,
}

impl ScheduleChanges {
    pub fn is_empty(&self) -> bool {
        self.shift_id.is_none() && self.date_schedule.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum ScheduleQuery {
    /// One employee's schedules with `from <= date < until`.
    Employee {
        employee_id: u64,
        from: NaiveDate,
        until: NaiveDate,
    },
    /// Everyone in a department on one date.
    Department {
        department_id: u64,
        date: NaiveDate,
        status: Option<String>,
    },
}
