//! Persistence seams. Handlers and services only ever see these traits; the
//! process builds one [`mysql::MySqlRepository`] at start and shares it.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppResult;
use crate::model::{
    attendance::{Attendance, AttendanceQuery, CheckOut, NewAttendance},
    department::{Department, DepartmentInput},
    employee::{EmployeeChanges, EmployeeCredentials, EmployeeProfile, NewEmployee},
    position::{Position, PositionInput},
    schedule::{NewSchedule, Schedule, ScheduleChanges, ScheduleQuery},
    shift::{NewShift, Shift},
    task::{ItemCheck, NewTask, Task, TaskLifecycle, TaskStatus},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn list_departments(&self) -> AppResult<Vec<Department>>;
    async fn find_department(&self, id: u64) -> AppResult<Option<Department>>;
    async fn insert_department(&self, input: DepartmentInput) -> AppResult<Department>;
    async fn update_department(&self, id: u64, input: DepartmentInput) -> AppResult<Option<Department>>;
    async fn delete_department(&self, id: u64) -> AppResult<bool>;

    async fn list_positions(&self, department_id: Option<u64>) -> AppResult<Vec<Position>>;
    async fn find_position(&self, id: u64) -> AppResult<Option<Position>>;
    async fn find_position_by_name(&self, name: &str) -> AppResult<Option<Position>>;
    async fn insert_position(&self, input: PositionInput) -> AppResult<Position>;
    async fn update_position(&self, id: u64, input: PositionInput) -> AppResult<Option<Position>>;
    async fn delete_position(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_profile(&self, id: u64) -> AppResult<Option<EmployeeProfile>>;
    async fn list_department_employees(&self, department_id: u64) -> AppResult<Vec<EmployeeProfile>>;
    async fn find_credentials(&self, email: &str) -> AppResult<Option<EmployeeCredentials>>;
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn insert_employee(&self, employee: NewEmployee) -> AppResult<u64>;
    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> AppResult<bool>;
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: u64,
    pub employee_id: u64,
    pub revoked: bool,
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn store_refresh_token(
        &self,
        employee_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>>;
    /// Idempotent; returns whether a live token was revoked.
    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn list_shifts(&self) -> AppResult<Vec<Shift>>;
    async fn find_shift(&self, id: u64) -> AppResult<Option<Shift>>;
    async fn insert_shift(&self, shift: NewShift) -> AppResult<Shift>;
    async fn update_shift(&self, id: u64, shift: NewShift) -> AppResult<Option<Shift>>;
    async fn delete_shift(&self, id: u64) -> AppResult<bool>;
    async fn shift_in_use(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_schedule(&self, id: u64) -> AppResult<Option<Schedule>>;
    async fn find_schedule_on(&self, employee_id: u64, date: NaiveDate) -> AppResult<Option<Schedule>>;
    /// Whether the employee has a schedule on `date`, ignoring `exclude_id`.
    async fn schedule_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<bool>;
    async fn insert_schedule(&self, schedule: NewSchedule) -> AppResult<Schedule>;
    async fn update_schedule(&self, id: u64, changes: ScheduleChanges) -> AppResult<()>;
    async fn delete_schedule(&self, id: u64) -> AppResult<bool>;
    /// Whether attendance or tasks still point at the schedule.
    async fn schedule_in_use(&self, id: u64) -> AppResult<bool>;
    async fn list_schedules(&self, query: ScheduleQuery) -> AppResult<Vec<Schedule>>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find_attendance(&self, schedule_id: u64, date: NaiveDate) -> AppResult<Option<Attendance>>;
    async fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance>;
    async fn record_check_out(&self, id: u64, check_out: CheckOut) -> AppResult<Attendance>;
    /// Attendance of one employee, oldest first.
    async fn list_attendance(&self, employee_id: u64, query: AttendanceQuery) -> AppResult<Vec<Attendance>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> AppResult<Task>;
    /// Finds a task in any lifecycle state.
    async fn find_task(&self, id: u64) -> AppResult<Option<Task>>;
    async fn latest_task(&self, employee_id: u64, date: Option<NaiveDate>) -> AppResult<Option<Task>>;
    async fn list_department_tasks(&self, department_id: u64, date: NaiveDate) -> AppResult<Vec<Task>>;
    /// Applies item checks and moves the task to review in one transaction.
    /// Fails with `NotFound` when an item does not belong to the task.
    async fn apply_checklist(
        &self,
        task_id: u64,
        checks: &[ItemCheck],
        message: Option<String>,
    ) -> AppResult<()>;
    async fn review_task(&self, id: u64, status: TaskStatus, feedback: Option<String>) -> AppResult<()>;
    async fn set_task_lifecycle(&self, id: u64, lifecycle: TaskLifecycle) -> AppResult<()>;
}

/// Everything the HTTP layer needs, behind one handle.
pub trait Repository:
    OrganizationRepository
    + EmployeeRepository
    + TokenRepository
    + ShiftRepository
    + ScheduleRepository
    + AttendanceRepository
    + TaskRepository
{
}

impl<T> Repository for T where
    T: OrganizationRepository
        + EmployeeRepository
        + TokenRepository
        + ShiftRepository
        + ScheduleRepository
        + AttendanceRepository
        + TaskRepository
{
}
