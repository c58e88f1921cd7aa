use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::clock::TimeOfDay;
use crate::domain::time_window::AttendanceStatus;

/// Where an employee is in the day's check-in/check-out sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceState {
    NoAttendance,
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attendance {
    pub id: u64,
    pub schedule_id: u64,
    pub date: NaiveDate,
    pub clock_in: TimeOfDay,
    pub clock_in_status: AttendanceStatus,
    pub clock_out: Option<TimeOfDay>,
    pub clock_out_status: Option<AttendanceStatus>,
    pub duration: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendance {
    pub fn state(record: Option<&Attendance>) -> AttendanceState {
        match record {
            None => AttendanceState::NoAttendance,
            Some(a) if a.clock_out.is_none() => AttendanceState::CheckedIn,
            Some(_) => AttendanceState::CheckedOut,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub schedule_id: u64,
    pub date: NaiveDate,
    pub clock_in: TimeOfDay,
    pub clock_in_status: AttendanceStatus,
}

/// The only columns a check-out writes.
#[derive(Debug, Clone)]
pub struct CheckOut {
    pub clock_out: TimeOfDay,
    pub clock_out_status: AttendanceStatus,
    pub duration: String,
}

#[derive(Debug, Clone)]
pub enum AttendanceQuery {
    Dates(Vec<NaiveDate>),
    /// Inclusive on both ends.
    Between(NaiveDate, NaiveDate),
    ClockInStatus(AttendanceStatus),
    ClockOutStatus(AttendanceStatus),
}
