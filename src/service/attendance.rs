//! Daily check-in/check-out state machine and attendance history.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::load_employee;
use crate::domain::clock::{TimeOfDay, month_start, wire_date};
use crate::domain::duration::WorkDuration;
use crate::domain::time_window::{AttendanceStatus, evaluate_check_in, evaluate_check_out};
use crate::error::{AppError, AppResult, FieldError};
use crate::model::{
    attendance::{Attendance, AttendanceQuery, AttendanceState, CheckOut, NewAttendance},
    employee::{EmployeeBrief, EmployeeProfile},
    schedule::Schedule,
    shift::Shift,
};
use crate::repository::{AttendanceRepository, EmployeeRepository, ScheduleRepository, ShiftRepository};

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleSummary {
    pub id: u64,
    #[serde(with = "wire_date")]
    #[schema(value_type = String, example = "16-10-2026")]
    pub date_schedule: NaiveDate,
    pub status: String,
    pub shift: Shift,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceView {
    pub id: u64,
    pub employee: EmployeeBrief,
    pub schedule: ScheduleSummary,
    #[schema(value_type = String, example = "2026-10-16")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "08:15")]
    pub clock_in: TimeOfDay,
    #[schema(value_type = Option<String>, example = "17:05")]
    pub clock_out: Option<TimeOfDay>,
    #[schema(example = "8 jam 50 menit")]
    pub duration: Option<String>,
    pub clock_in_status: AttendanceStatus,
    pub clock_out_status: Option<AttendanceStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which status column to filter attendance history on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    ClockIn(AttendanceStatus),
    ClockOut(AttendanceStatus),
}

impl StatusFilter {
    /// Exactly one of the two query parameters must be present.
    pub fn from_query(clock_in_status: Option<&str>, clock_out_status: Option<&str>) -> AppResult<Self> {
        let parse = |raw: &str, field: &str| {
            raw.parse::<AttendanceStatus>().map_err(|_| AppError::Validation {
                message: "Validation failed".to_string(),
                errors: vec![FieldError::new(
                    field,
                    "Must be one of: Tepat Waktu, Terlambat, Pulang Lebih Awal",
                )],
            })
        };

        match (clock_in_status, clock_out_status) {
            (Some(raw), None) => Ok(StatusFilter::ClockIn(parse(raw, "clock_in_status")?)),
            (None, Some(raw)) => Ok(StatusFilter::ClockOut(parse(raw, "clock_out_status")?)),
            _ => Err(AppError::validation(
                "Provide exactly one of clock_in_status or clock_out_status",
            )),
        }
    }
}

impl From<StatusFilter> for AttendanceQuery {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::ClockIn(s) => AttendanceQuery::ClockInStatus(s),
            StatusFilter::ClockOut(s) => AttendanceQuery::ClockOutStatus(s),
        }
    }
}

async fn todays_schedule<R>(repo: &R, employee_id: u64, today: NaiveDate) -> AppResult<Schedule>
where
    R: ScheduleRepository + ?Sized,
{
    repo.find_schedule_on(employee_id, today).await?.ok_or_else(|| {
        warn!(employee_id, date = %today, "No schedule for today");
        AppError::not_found("Schedule not found for today")
    })
}

async fn schedule_shift<R>(repo: &R, schedule: &Schedule) -> AppResult<Shift>
where
    R: ShiftRepository + ?Sized,
{
    repo.find_shift(schedule.shift_id)
        .await?
        .ok_or_else(|| AppError::not_found("Shift not found"))
}

fn view(employee: &EmployeeProfile, schedule: Schedule, shift: Shift, attendance: Attendance) -> AttendanceView {
    AttendanceView {
        id: attendance.id,
        employee: employee.brief(),
        schedule: ScheduleSummary {
            id: schedule.id,
            date_schedule: schedule.date_schedule,
            status: schedule.status,
            shift,
        },
        date: attendance.date,
        clock_in: attendance.clock_in,
        clock_out: attendance.clock_out,
        duration: attendance.duration,
        clock_in_status: attendance.clock_in_status,
        clock_out_status: attendance.clock_out_status,
        created_at: attendance.created_at,
        updated_at: attendance.updated_at,
    }
}

/// `NoAttendance -> CheckedIn`.
pub async fn check_in<R>(repo: &R, employee_id: u64, today: NaiveDate, clock_in: &str) -> AppResult<AttendanceView>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let employee = load_employee(repo, employee_id).await?;
    let clock_in = TimeOfDay::parse_field(clock_in, "clock_in")?;
    let schedule = todays_schedule(repo, employee_id, today).await?;

    let existing = repo.find_attendance(schedule.id, today).await?;
    if Attendance::state(existing.as_ref()) != AttendanceState::NoAttendance {
        warn!(employee_id, schedule_id = schedule.id, "Repeated check-in rejected");
        return Err(AppError::conflict("You have already checked in today"));
    }

    let shift = schedule_shift(repo, &schedule).await?;
    let status = evaluate_check_in(clock_in, shift.start_time).map_err(|e| {
        warn!(employee_id, %clock_in, start = %shift.start_time, "Clock-in outside window");
        AppError::from(e)
    })?;

    let attendance = repo
        .insert_attendance(NewAttendance {
            schedule_id: schedule.id,
            date: today,
            clock_in,
            clock_in_status: status,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => AppError::conflict("You have already checked in today"),
            other => other,
        })?;

    info!(
        employee_id,
        attendance_id = attendance.id,
        %clock_in,
        status = %status,
        "Checked in"
    );

    Ok(view(&employee, schedule, shift, attendance))
}

/// `CheckedIn -> CheckedOut`. Only the clock-out columns are written.
pub async fn check_out<R>(repo: &R, employee_id: u64, today: NaiveDate, clock_out: &str) -> AppResult<AttendanceView>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let employee = load_employee(repo, employee_id).await?;
    let clock_out = TimeOfDay::parse_field(clock_out, "clock_out")?;
    let schedule = todays_schedule(repo, employee_id, today).await?;

    let existing = repo.find_attendance(schedule.id, today).await?;
    let record = match (Attendance::state(existing.as_ref()), existing) {
        (AttendanceState::CheckedIn, Some(record)) => record,
        (AttendanceState::CheckedOut, _) => {
            warn!(employee_id, schedule_id = schedule.id, "Repeated check-out rejected");
            return Err(AppError::conflict("You have already checked out today"));
        }
        _ => {
            warn!(employee_id, schedule_id = schedule.id, "Check-out without check-in");
            return Err(AppError::not_found(
                "No check-in record found for today. Please check-in first",
            ));
        }
    };

    let shift = schedule_shift(repo, &schedule).await?;
    let status = evaluate_check_out(clock_out, shift.end_time);
    let duration = WorkDuration::between(record.clock_in, clock_out);

    let attendance = repo
        .record_check_out(
            record.id,
            CheckOut {
                clock_out,
                clock_out_status: status,
                duration: duration.to_string(),
            },
        )
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => AppError::conflict("You have already checked out today"),
            other => other,
        })?;

    info!(
        employee_id,
        attendance_id = attendance.id,
        %clock_out,
        status = %status,
        minutes = duration.total_minutes(),
        "Checked out"
    );

    Ok(view(&employee, schedule, shift, attendance))
}

async fn history<R>(repo: &R, employee_id: u64, query: AttendanceQuery) -> AppResult<Vec<AttendanceView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let employee = load_employee(repo, employee_id).await?;
    let records = repo.list_attendance(employee_id, query).await?;

    let mut views = Vec::with_capacity(records.len());
    for attendance in records {
        let schedule = repo
            .find_schedule(attendance.schedule_id)
            .await?
            .ok_or_else(|| AppError::not_found("Schedule not found"))?;
        let shift = schedule_shift(repo, &schedule).await?;
        views.push(view(&employee, schedule, shift, attendance));
    }
    Ok(views)
}

/// Today's record, or `None` when there is no schedule or no check-in yet.
pub async fn today<R>(repo: &R, employee_id: u64, today: NaiveDate) -> AppResult<Option<AttendanceView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let employee = load_employee(repo, employee_id).await?;
    let Some(schedule) = repo.find_schedule_on(employee_id, today).await? else {
        return Ok(None);
    };
    let Some(attendance) = repo.find_attendance(schedule.id, today).await? else {
        return Ok(None);
    };

    let shift = schedule_shift(repo, &schedule).await?;
    Ok(Some(view(&employee, schedule, shift, attendance)))
}

/// Today and the two days before it.
pub async fn last_three_days<R>(repo: &R, employee_id: u64, today: NaiveDate) -> AppResult<Vec<AttendanceView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let dates = (0..3)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();
    history(repo, employee_id, AttendanceQuery::Dates(dates)).await
}

pub async fn this_month<R>(repo: &R, employee_id: u64, today: NaiveDate) -> AppResult<Vec<AttendanceView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    let first = month_start(today, 0);
    let last = month_start(today, 1).pred_opt().unwrap_or(today);
    history(repo, employee_id, AttendanceQuery::Between(first, last)).await
}

pub async fn by_status<R>(repo: &R, employee_id: u64, filter: StatusFilter) -> AppResult<Vec<AttendanceView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + AttendanceRepository + ?Sized,
{
    history(repo, employee_id, filter.into()).await
}
