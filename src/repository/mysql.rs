use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};
use tracing::debug;

use super::{
    AttendanceRepository, EmployeeRepository, OrganizationRepository, RefreshTokenRecord,
    ScheduleRepository, ShiftRepository, TaskRepository, TokenRepository,
};
use crate::domain::clock::TimeOfDay;
use crate::domain::time_window::AttendanceStatus;
use crate::error::{AppError, AppResult};
use crate::model::{
    attendance::{Attendance, AttendanceQuery, CheckOut, NewAttendance},
    department::{Department, DepartmentInput},
    employee::{EmployeeChanges, EmployeeCredentials, EmployeeProfile, NewEmployee},
    position::{Position, PositionInput},
    schedule::{NewSchedule, Schedule, ScheduleChanges, ScheduleQuery},
    shift::{NewShift, Shift},
    task::{ItemCheck, NewTask, Task, TaskItem, TaskLifecycle, TaskStatus},
};
use crate::utils::db_utils::{SqlUpdate, execute_update};

/// Stored labels are parsed back into enums; a bad label is a data fault.
fn parse_column<T: FromStr>(value: &str, column: &str) -> AppResult<T> {
    value.parse().map_err(|_| {
        tracing::error!(column, value, "Unrecognised value in column");
        AppError::internal(format!("bad value in {column}"))
    })
}

#[derive(FromRow)]
struct PositionRow {
    id: u64,
    department_id: u64,
    position_name: String,
    role: String,
}

impl TryFrom<PositionRow> for Position {
    type Error = AppError;

    fn try_from(row: PositionRow) -> AppResult<Self> {
        Ok(Position {
            id: row.id,
            department_id: row.department_id,
            position_name: row.position_name,
            role: parse_column(&row.role, "positions.role")?,
        })
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: u64,
    name: String,
    email: String,
    phone: String,
    photo: Option<String>,
    position_id: u64,
    position_name: String,
    department_id: u64,
    role: String,
}

impl TryFrom<ProfileRow> for EmployeeProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> AppResult<Self> {
        Ok(EmployeeProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            photo: row.photo,
            position_id: row.position_id,
            position_name: row.position_name,
            department_id: row.department_id,
            role: parse_column(&row.role, "positions.role")?,
        })
    }
}

const PROFILE_SELECT: &str = r#"
    SELECT e.id, e.name, e.email, e.phone, e.photo, e.position_id,
           p.position_name, p.department_id, p.role
    FROM employees e
    JOIN positions p ON p.id = e.position_id
"#;

#[derive(FromRow)]
struct ShiftRow {
    id: u64,
    shift_type: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            shift_type: row.shift_type,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
        }
    }
}

const SHIFT_SELECT: &str = "SELECT id, type AS shift_type, start_time, end_time FROM shifts";

#[derive(FromRow)]
struct ScheduleRow {
    id: u64,
    employee_id: u64,
    shift_id: u64,
    created_by: u64,
    date_schedule: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Schedule {
            id: row.id,
            employee_id: row.employee_id,
            shift_id: row.shift_id,
            created_by: row.created_by,
            date_schedule: row.date_schedule,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SCHEDULE_COLUMNS: &str =
    "s.id, s.employee_id, s.shift_id, s.created_by, s.date_schedule, s.status, s.created_at, s.updated_at";

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    schedule_id: u64,
    date: NaiveDate,
    clock_in: NaiveTime,
    clock_in_status: String,
    clock_out: Option<NaiveTime>,
    clock_out_status: Option<String>,
    duration: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> AppResult<Self> {
        let clock_out_status = row
            .clock_out_status
            .as_deref()
            .map(|s| parse_column::<AttendanceStatus>(s, "attendance.clock_out_status"))
            .transpose()?;

        Ok(Attendance {
            id: row.id,
            schedule_id: row.schedule_id,
            date: row.date,
            clock_in: row.clock_in.into(),
            clock_in_status: parse_column(&row.clock_in_status, "attendance.clock_in_status")?,
            clock_out: row.clock_out.map(TimeOfDay::from),
            clock_out_status,
            duration: row.duration,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ATTENDANCE_COLUMNS: &str = "a.id, a.schedule_id, a.date, a.clock_in, a.clock_in_status, \
     a.clock_out, a.clock_out_status, a.duration, a.created_at, a.updated_at";

#[derive(FromRow)]
struct TaskRow {
    id: u64,
    employee_id: u64,
    schedule_id: u64,
    created_by: u64,
    date_task: NaiveDate,
    deadline: NaiveDate,
    status: String,
    message: String,
    feedback: String,
    lifecycle: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TaskItemRow {
    id: u64,
    task_id: u64,
    description: String,
    is_completed: bool,
}

const TASK_COLUMNS: &str = "t.id, t.employee_id, t.schedule_id, t.created_by, t.date_task, \
     t.deadline, t.status, t.message, t.feedback, t.lifecycle, t.created_at, t.updated_at";

/// All persistence against MySQL.
#[derive(Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_attendance_by_id(&self, id: u64) -> AppResult<Attendance> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.id = ?"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    /// Loads checklist items for a batch of task rows.
    async fn with_items(&self, rows: Vec<TaskRow>) -> AppResult<Vec<Task>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<MySql>::new(
            "SELECT id, task_id, description, is_completed FROM task_items WHERE task_id IN (",
        );
        let mut ids = builder.separated(", ");
        for row in &rows {
            ids.push_bind(row.id);
        }
        builder.push(") ORDER BY id");

        let items = builder
            .build_query_as::<TaskItemRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> AppResult<Task> {
                let task_items = items
                    .iter()
                    .filter(|i| i.task_id == row.id)
                    .map(|i| TaskItem {
                        id: i.id,
                        task_id: i.task_id,
                        description: i.description.clone(),
                        is_completed: i.is_completed,
                    })
                    .collect();

                Ok(Task {
                    id: row.id,
                    employee_id: row.employee_id,
                    schedule_id: row.schedule_id,
                    created_by: row.created_by,
                    date_task: row.date_task,
                    deadline: row.deadline,
                    status: parse_column(&row.status, "tasks.status")?,
                    message: row.message,
                    feedback: row.feedback,
                    lifecycle: parse_column(&row.lifecycle, "tasks.lifecycle")?,
                    items: task_items,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    async fn fetch_task(&self, id: u64) -> AppResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrganizationRepository for MySqlRepository {
    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT id, parent_department_id, department_name FROM departments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_department(&self, id: u64) -> AppResult<Option<Department>> {
        let row = sqlx::query_as::<_, Department>(
            "SELECT id, parent_department_id, department_name FROM departments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_department(&self, input: DepartmentInput) -> AppResult<Department> {
        let result = sqlx::query("INSERT INTO departments (parent_department_id, department_name) VALUES (?, ?)")
            .bind(input.parent_department_id)
            .bind(&input.department_name)
            .execute(&self.pool)
            .await?;

        Ok(Department {
            id: result.last_insert_id(),
            parent_department_id: input.parent_department_id,
            department_name: input.department_name,
        })
    }

    async fn update_department(&self, id: u64, input: DepartmentInput) -> AppResult<Option<Department>> {
        if self.find_department(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE departments SET parent_department_id = ?, department_name = ? WHERE id = ?")
            .bind(input.parent_department_id)
            .bind(&input.department_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_department(id).await
    }

    async fn delete_department(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_positions(&self, department_id: Option<u64>) -> AppResult<Vec<Position>> {
        let mut builder =
            QueryBuilder::<MySql>::new("SELECT id, department_id, position_name, role FROM positions");
        if let Some(department_id) = department_id {
            builder.push(" WHERE department_id = ").push_bind(department_id);
        }
        builder.push(" ORDER BY id");

        builder
            .build_query_as::<PositionRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    async fn find_position(&self, id: u64) -> AppResult<Option<Position>> {
        sqlx::query_as::<_, PositionRow>(
            "SELECT id, department_id, position_name, role FROM positions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Position::try_from)
        .transpose()
    }

    async fn find_position_by_name(&self, name: &str) -> AppResult<Option<Position>> {
        sqlx::query_as::<_, PositionRow>(
            "SELECT id, department_id, position_name, role FROM positions WHERE position_name = ? LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(Position::try_from)
        .transpose()
    }

    async fn insert_position(&self, input: PositionInput) -> AppResult<Position> {
        let result = sqlx::query("INSERT INTO positions (department_id, position_name, role) VALUES (?, ?, ?)")
            .bind(input.department_id)
            .bind(&input.position_name)
            .bind(input.role.as_ref())
            .execute(&self.pool)
            .await?;

        Ok(Position {
            id: result.last_insert_id(),
            department_id: input.department_id,
            position_name: input.position_name,
            role: input.role,
        })
    }

    async fn update_position(&self, id: u64, input: PositionInput) -> AppResult<Option<Position>> {
        if self.find_position(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE positions SET department_id = ?, position_name = ?, role = ? WHERE id = ?")
            .bind(input.department_id)
            .bind(&input.position_name)
            .bind(input.role.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_position(id).await
    }

    async fn delete_position(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM positions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmployeeRepository for MySqlRepository {
    async fn find_profile(&self, id: u64) -> AppResult<Option<EmployeeProfile>> {
        sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(EmployeeProfile::try_from)
            .transpose()
    }

    async fn list_department_employees(&self, department_id: u64) -> AppResult<Vec<EmployeeProfile>> {
        sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.department_id = ? ORDER BY e.id"))
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(EmployeeProfile::try_from)
            .collect()
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<EmployeeCredentials>> {
        let row = sqlx::query_as::<_, EmployeeCredentials>(
            "SELECT id, email, password FROM employees WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_employee(&self, employee: NewEmployee) -> AppResult<u64> {
        let result = sqlx::query(
            "INSERT INTO employees (position_id, name, email, password, phone) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(employee.position_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(&employee.phone)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> AppResult<bool> {
        if self.find_profile(id).await?.is_none() {
            return Ok(false);
        }

        let update = SqlUpdate::new("employees")
            .set_some("name", changes.name)
            .set_some("phone", changes.phone)
            .set_some("password", changes.password_hash);
        execute_update(&self.pool, update, id).await?;
        Ok(true)
    }
}

#[async_trait]
impl TokenRepository for MySqlRepository {
    async fn store_refresh_token(
        &self,
        employee_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        debug!(employee_id, jti, "Storing refresh token");
        sqlx::query("INSERT INTO refresh_tokens (employee_id, jti, expires_at) VALUES (?, ?, ?)")
            .bind(employee_id)
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, (u64, u64, bool)>(
            "SELECT id, employee_id, revoked FROM refresh_tokens WHERE jti = ?",
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, employee_id, revoked)| RefreshTokenRecord {
            id,
            employee_id,
            revoked,
        }))
    }

    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ? AND revoked = FALSE")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ShiftRepository for MySqlRepository {
    async fn list_shifts(&self) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(&format!("{SHIFT_SELECT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Shift::from).collect())
    }

    async fn find_shift(&self, id: u64) -> AppResult<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(&format!("{SHIFT_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Shift::from))
    }

    async fn insert_shift(&self, shift: NewShift) -> AppResult<Shift> {
        let result = sqlx::query("INSERT INTO shifts (type, start_time, end_time) VALUES (?, ?, ?)")
            .bind(&shift.shift_type)
            .bind(shift.start_time.to_naive_time())
            .bind(shift.end_time.to_naive_time())
            .execute(&self.pool)
            .await?;

        Ok(Shift {
            id: result.last_insert_id(),
            shift_type: shift.shift_type,
            start_time: shift.start_time,
            end_time: shift.end_time,
        })
    }

    async fn update_shift(&self, id: u64, shift: NewShift) -> AppResult<Option<Shift>> {
        if self.find_shift(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE shifts SET type = ?, start_time = ?, end_time = ? WHERE id = ?")
            .bind(&shift.shift_type)
            .bind(shift.start_time.to_naive_time())
            .bind(shift.end_time.to_naive_time())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(Shift {
            id,
            shift_type: shift.shift_type,
            start_time: shift.start_time,
            end_time: shift.end_time,
        }))
    }

    async fn delete_shift(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn shift_in_use(&self, id: u64) -> AppResult<bool> {
        let used = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM schedules WHERE shift_id = ? LIMIT 1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }
}

#[async_trait]
impl ScheduleRepository for MySqlRepository {
    async fn find_schedule(&self, id: u64) -> AppResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules s WHERE s.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Schedule::from))
    }

    async fn find_schedule_on(&self, employee_id: u64, date: NaiveDate) -> AppResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules s WHERE s.employee_id = ? AND s.date_schedule = ?"
        ))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Schedule::from))
    }

    async fn schedule_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<bool> {
        let mut builder = QueryBuilder::<MySql>::new(
            "SELECT EXISTS(SELECT 1 FROM schedules WHERE employee_id = ",
        );
        builder
            .push_bind(employee_id)
            .push(" AND date_schedule = ")
            .push_bind(date);
        if let Some(id) = exclude_id {
            builder.push(" AND id <> ").push_bind(id);
        }
        builder.push(")");

        let exists = builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_schedule(&self, schedule: NewSchedule) -> AppResult<Schedule> {
        let result = sqlx::query(
            "INSERT INTO schedules (employee_id, shift_id, created_by, date_schedule, status) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(schedule.employee_id)
        .bind(schedule.shift_id)
        .bind(schedule.created_by)
        .bind(schedule.date_schedule)
        .bind(&schedule.status)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_schedule(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("schedule {id} vanished after insert")))
    }

    async fn update_schedule(&self, id: u64, changes: ScheduleChanges) -> AppResult<()> {
        let update = SqlUpdate::new("schedules")
            .set_some("shift_id", changes.shift_id)
            .set_some("date_schedule", changes.date_schedule)
            .set_some("status", changes.status);
        execute_update(&self.pool, update, id).await?;
        Ok(())
    }

    async fn delete_schedule(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn schedule_in_use(&self, id: u64) -> AppResult<bool> {
        let used = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendance WHERE schedule_id = ?) \
             OR EXISTS(SELECT 1 FROM tasks WHERE schedule_id = ?)",
        )
        .bind(id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    async fn list_schedules(&self, query: ScheduleQuery) -> AppResult<Vec<Schedule>> {
        let mut builder = QueryBuilder::<MySql>::new(format!("SELECT {SCHEDULE_COLUMNS} FROM schedules s"));

        match query {
            ScheduleQuery::Employee {
                employee_id,
                from,
                until,
            } => {
                builder
                    .push(" WHERE s.employee_id = ")
                    .push_bind(employee_id)
                    .push(" AND s.date_schedule >= ")
                    .push_bind(from)
                    .push(" AND s.date_schedule < ")
                    .push_bind(until);
            }
            ScheduleQuery::Department {
                department_id,
                date,
                status,
            } => {
                builder
                    .push(
                        " JOIN employees e ON e.id = s.employee_id \
                          JOIN positions p ON p.id = e.position_id \
                          WHERE p.department_id = ",
                    )
                    .push_bind(department_id)
                    .push(" AND s.date_schedule = ")
                    .push_bind(date);
                if let Some(status) = status {
                    builder.push(" AND s.status = ").push_bind(status);
                }
            }
        }
        builder.push(" ORDER BY s.date_schedule, s.id");

        let rows = builder
            .build_query_as::<ScheduleRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }
}

#[async_trait]
impl AttendanceRepository for MySqlRepository {
    async fn find_attendance(&self, schedule_id: u64, date: NaiveDate) -> AppResult<Option<Attendance>> {
        sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.schedule_id = ? AND a.date = ?"
        ))
        .bind(schedule_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?
        .map(Attendance::try_from)
        .transpose()
    }

    async fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let result = sqlx::query(
            "INSERT INTO attendance (schedule_id, date, clock_in, clock_in_status) VALUES (?, ?, ?, ?)",
        )
        .bind(attendance.schedule_id)
        .bind(attendance.date)
        .bind(attendance.clock_in.to_naive_time())
        .bind(attendance.clock_in_status.as_ref())
        .execute(&self.pool)
        .await?;

        self.fetch_attendance_by_id(result.last_insert_id()).await
    }

    async fn record_check_out(&self, id: u64, check_out: CheckOut) -> AppResult<Attendance> {
        let update = SqlUpdate::new("attendance")
            .set("clock_out", check_out.clock_out.to_naive_time())
            .set("clock_out_status", check_out.clock_out_status.as_ref())
            .set("duration", check_out.duration)
            .where_null("clock_out");
        if execute_update(&self.pool, update, id).await? == 0 {
            return Err(AppError::conflict("Attendance already checked out"));
        }

        self.fetch_attendance_by_id(id).await
    }

    async fn list_attendance(&self, employee_id: u64, query: AttendanceQuery) -> AppResult<Vec<Attendance>> {
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance a \
             JOIN schedules s ON s.id = a.schedule_id \
             WHERE s.employee_id = "
        ));
        builder.push_bind(employee_id);

        match query {
            AttendanceQuery::Dates(dates) => {
                if dates.is_empty() {
                    return Ok(Vec::new());
                }
                builder.push(" AND a.date IN (");
                let mut separated = builder.separated(", ");
                for date in dates {
                    separated.push_bind(date);
                }
                builder.push(")");
            }
            AttendanceQuery::Between(from, to) => {
                builder
                    .push(" AND a.date BETWEEN ")
                    .push_bind(from)
                    .push(" AND ")
                    .push_bind(to);
            }
            AttendanceQuery::ClockInStatus(status) => {
                builder
                    .push(" AND a.clock_in_status = ")
                    .push_bind(status.as_ref().to_string());
            }
            AttendanceQuery::ClockOutStatus(status) => {
                builder
                    .push(" AND a.clock_out_status = ")
                    .push_bind(status.as_ref().to_string());
            }
        }
        builder.push(" ORDER BY a.date, a.id");

        builder
            .build_query_as::<AttendanceRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Attendance::try_from)
            .collect()
    }
}

#[async_trait]
impl TaskRepository for MySqlRepository {
    async fn insert_task(&self, task: NewTask) -> AppResult<Task> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO tasks (employee_id, schedule_id, created_by, date_task, deadline, status, message, feedback, lifecycle) \
             VALUES (?, ?, ?, ?, ?, ?, '-', '-', ?)",
        )
        .bind(task.employee_id)
        .bind(task.schedule_id)
        .bind(task.created_by)
        .bind(task.date_task)
        .bind(task.deadline)
        .bind(TaskStatus::NotStarted.as_ref())
        .bind(TaskLifecycle::Active.as_ref())
        .execute(&mut *tx)
        .await?;
        let task_id = result.last_insert_id();

        for description in &task.items {
            sqlx::query("INSERT INTO task_items (task_id, description, is_completed) VALUES (?, ?, FALSE)")
                .bind(task_id)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.fetch_task(task_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("task {task_id} vanished after insert")))
    }

    async fn find_task(&self, id: u64) -> AppResult<Option<Task>> {
        self.fetch_task(id).await
    }

    async fn latest_task(&self, employee_id: u64, date: Option<NaiveDate>) -> AppResult<Option<Task>> {
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.employee_id = "
        ));
        builder
            .push_bind(employee_id)
            .push(" AND t.lifecycle = ")
            .push_bind(TaskLifecycle::Active.as_ref());
        if let Some(date) = date {
            builder.push(" AND t.date_task = ").push_bind(date);
        }
        builder.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT 1");

        let row = builder
            .build_query_as::<TaskRow>()
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_department_tasks(&self, department_id: u64, date: NaiveDate) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             JOIN employees e ON e.id = t.employee_id \
             JOIN positions p ON p.id = e.position_id \
             WHERE p.department_id = ? AND t.date_task = ? AND t.lifecycle = ? \
             ORDER BY t.id"
        ))
        .bind(department_id)
        .bind(date)
        .bind(TaskLifecycle::Active.as_ref())
        .fetch_all(&self.pool)
        .await?;

        self.with_items(rows).await
    }

    async fn apply_checklist(
        &self,
        task_id: u64,
        checks: &[ItemCheck],
        message: Option<String>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, u64>("SELECT id FROM task_items WHERE task_id = ? FOR UPDATE")
            .bind(task_id)
            .fetch_all(&mut *tx)
            .await?;

        // dropping tx rolls back
        if let Some(missing) = checks.iter().find(|c| !owned.contains(&c.item_id)) {
            return Err(AppError::not_found(format!(
                "Task item with ID {} not found",
                missing.item_id
            )));
        }

        for check in checks {
            sqlx::query("UPDATE task_items SET is_completed = ? WHERE id = ? AND task_id = ?")
                .bind(check.is_completed)
                .bind(check.item_id)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
        }

        let update = SqlUpdate::new("tasks")
            .set("status", TaskStatus::UnderReview.as_ref())
            .set("feedback", "-")
            .set_some("message", message);
        execute_update(&mut *tx, update, task_id).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn review_task(&self, id: u64, status: TaskStatus, feedback: Option<String>) -> AppResult<()> {
        let update = SqlUpdate::new("tasks")
            .set("status", status.as_ref())
            .set_some("feedback", feedback);
        execute_update(&self.pool, update, id).await?;
        Ok(())
    }

    async fn set_task_lifecycle(&self, id: u64, lifecycle: TaskLifecycle) -> AppResult<()> {
        sqlx::query("UPDATE tasks SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle.as_ref())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
