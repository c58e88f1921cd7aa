use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{
    AttendanceRepository, EmployeeRepository, OrganizationRepository, RefreshTokenRecord,
    ScheduleRepository, ShiftRepository, TaskRepository, TokenRepository,
};
use crate::domain::clock::TimeOfDay;
use crate::error::{AppError, AppResult};
use crate::model::{
    attendance::{Attendance, AttendanceQuery, CheckOut, NewAttendance},
    department::{Department, DepartmentInput},
    employee::{EmployeeChanges, EmployeeCredentials, EmployeeProfile, NewEmployee},
    position::{Position, PositionInput},
    role::PositionRole,
    schedule::{NewSchedule, Schedule, ScheduleChanges, ScheduleQuery},
    shift::{NewShift, Shift},
    task::{ItemCheck, NewTask, Task, TaskItem, TaskLifecycle, TaskStatus},
};

#[derive(Debug, Clone)]
struct StoredEmployee {
    id: u64,
    position_id: u64,
    name: String,
    email: String,
    password: String,
    phone: String,
}

#[derive(Default)]
struct Store {
    next_id: u64,
    departments: HashMap<u64, Department>,
    positions: HashMap<u64, Position>,
    employees: HashMap<u64, StoredEmployee>,
    tokens: HashMap<String, RefreshTokenRecord>,
    shifts: HashMap<u64, Shift>,
    schedules: HashMap<u64, Schedule>,
    attendance: HashMap<u64, Attendance>,
    tasks: HashMap<u64, Task>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn profile(&self, employee: &StoredEmployee) -> Option<EmployeeProfile> {
        let position = self.positions.get(&employee.position_id)?;
        Some(EmployeeProfile {
            id: employee.id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
            photo: None,
            position_id: position.id,
            position_name: position.position_name.clone(),
            department_id: position.department_id,
            role: position.role,
        })
    }

    fn department_of(&self, employee_id: u64) -> Option<u64> {
        let employee = self.employees.get(&employee_id)?;
        self.positions.get(&employee.position_id).map(|p| p.department_id)
    }

    fn schedule_referenced(&self, schedule_id: u64) -> bool {
        self.attendance.values().any(|a| a.schedule_id == schedule_id)
            || self.tasks.values().any(|t| t.schedule_id == schedule_id)
    }

    fn task_mut(&mut self, id: u64) -> AppResult<&mut Task> {
        self.tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Task not found"))
    }
}

fn sorted<T: Clone, K: Ord>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = values.collect();
    out.sort_by_key(|v| key(v));
    out
}

/// In-process store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| AppError::internal("memory store poisoned"))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| AppError::internal("memory store poisoned"))
    }
}

#[async_trait]
impl OrganizationRepository for MemoryRepository {
    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let store = self.read()?;
        Ok(sorted(store.departments.values().cloned(), |d| d.id))
    }

    async fn find_department(&self, id: u64) -> AppResult<Option<Department>> {
        Ok(self.read()?.departments.get(&id).cloned())
    }

    async fn insert_department(&self, input: DepartmentInput) -> AppResult<Department> {
        let mut store = self.write()?;
        let department = Department {
            id: store.next_id(),
            parent_department_id: input.parent_department_id,
            department_name: input.department_name,
        };
        store.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn update_department(&self, id: u64, input: DepartmentInput) -> AppResult<Option<Department>> {
        let mut store = self.write()?;
        Ok(store.departments.get_mut(&id).map(|d| {
            d.parent_department_id = input.parent_department_id;
            d.department_name = input.department_name;
            d.clone()
        }))
    }

    async fn delete_department(&self, id: u64) -> AppResult<bool> {
        Ok(self.write()?.departments.remove(&id).is_some())
    }

    async fn list_positions(&self, department_id: Option<u64>) -> AppResult<Vec<Position>> {
        let store = self.read()?;
        Ok(sorted(
            store
                .positions
                .values()
                .filter(|p| department_id.is_none_or(|d| p.department_id == d))
                .cloned(),
            |p| p.id,
        ))
    }

    async fn find_position(&self, id: u64) -> AppResult<Option<Position>> {
        Ok(self.read()?.positions.get(&id).cloned())
    }

    async fn find_position_by_name(&self, name: &str) -> AppResult<Option<Position>> {
        let store = self.read()?;
        Ok(store
            .positions
            .values()
            .find(|p| p.position_name == name)
            .cloned())
    }

    async fn insert_position(&self, input: PositionInput) -> AppResult<Position> {
        let mut store = self.write()?;
        let position = Position {
            id: store.next_id(),
            department_id: input.department_id,
            position_name: input.position_name,
            role: input.role,
        };
        store.positions.insert(position.id, position.clone());
        Ok(position)
    }

    async fn update_position(&self, id: u64, input: PositionInput) -> AppResult<Option<Position>> {
        let mut store = self.write()?;
        Ok(store.positions.get_mut(&id).map(|p| {
            p.department_id = input.department_id;
            p.position_name = input.position_name;
            p.role = input.role;
            p.clone()
        }))
    }

    async fn delete_position(&self, id: u64) -> AppResult<bool> {
        Ok(self.write()?.positions.remove(&id).is_some())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryRepository {
    async fn find_profile(&self, id: u64) -> AppResult<Option<EmployeeProfile>> {
        let store = self.read()?;
        Ok(store.employees.get(&id).and_then(|e| store.profile(e)))
    }

    async fn list_department_employees(&self, department_id: u64) -> AppResult<Vec<EmployeeProfile>> {
        let store = self.read()?;
        Ok(sorted(
            store
                .employees
                .values()
                .filter_map(|e| store.profile(e))
                .filter(|p| p.department_id == department_id),
            |p| p.id,
        ))
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<EmployeeCredentials>> {
        let store = self.read()?;
        Ok(store
            .employees
            .values()
            .find(|e| e.email == email)
            .map(|e| EmployeeCredentials {
                id: e.id,
                email: e.email.clone(),
                password: e.password.clone(),
            }))
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.read()?.employees.values().any(|e| e.email == email))
    }

    async fn insert_employee(&self, employee: NewEmployee) -> AppResult<u64> {
        let mut store = self.write()?;
        if store.employees.values().any(|e| e.email == employee.email) {
            return Err(AppError::conflict("Record already exists"));
        }
        let id = store.next_id();
        store.employees.insert(
            id,
            StoredEmployee {
                id,
                position_id: employee.position_id,
                name: employee.name,
                email: employee.email,
                password: employee.password_hash,
                phone: employee.phone,
            },
        );
        Ok(id)
    }

    async fn update_employee(&self, id: u64, changes: EmployeeChanges) -> AppResult<bool> {
        let mut store = self.write()?;
        let Some(employee) = store.employees.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = changes.name {
            employee.name = name;
        }
        if let Some(phone) = changes.phone {
            employee.phone = phone;
        }
        if let Some(hash) = changes.password_hash {
            employee.password = hash;
        }
        Ok(true)
    }
}

#[async_trait]
impl TokenRepository for MemoryRepository {
    async fn store_refresh_token(
        &self,
        employee_id: u64,
        jti: &str,
        _expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut store = self.write()?;
        let id = store.next_id();
        store.tokens.insert(
            jti.to_string(),
            RefreshTokenRecord {
                id,
                employee_id,
                revoked: false,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.read()?.tokens.get(jti).cloned())
    }

    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool> {
        let mut store = self.write()?;
        Ok(match store.tokens.get_mut(jti) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl ShiftRepository for MemoryRepository {
    async fn list_shifts(&self) -> AppResult<Vec<Shift>> {
        let store = self.read()?;
        Ok(sorted(store.shifts.values().cloned(), |s| s.id))
    }

    async fn find_shift(&self, id: u64) -> AppResult<Option<Shift>> {
        Ok(self.read()?.shifts.get(&id).cloned())
    }

    async fn insert_shift(&self, shift: NewShift) -> AppResult<Shift> {
        let mut store = self.write()?;
        let shift = Shift {
            id: store.next_id(),
            shift_type: shift.shift_type,
            start_time: shift.start_time,
            end_time: shift.end_time,
        };
        store.shifts.insert(shift.id, shift.clone());
        Ok(shift)
    }

    async fn update_shift(&self, id: u64, shift: NewShift) -> AppResult<Option<Shift>> {
        let mut store = self.write()?;
        Ok(store.shifts.get_mut(&id).map(|s| {
            s.shift_type = shift.shift_type;
            s.start_time = shift.start_time;
            s.end_time = shift.end_time;
            s.clone()
        }))
    }

    async fn delete_shift(&self, id: u64) -> AppResult<bool> {
        Ok(self.write()?.shifts.remove(&id).is_some())
    }

    async fn shift_in_use(&self, id: u64) -> AppResult<bool> {
        Ok(self.read()?.schedules.values().any(|s| s.shift_id == id))
    }
}

#[async_trait]
impl ScheduleRepository for MemoryRepository {
    async fn find_schedule(&self, id: u64) -> AppResult<Option<Schedule>> {
        Ok(self.read()?.schedules.get(&id).cloned())
    }

    async fn find_schedule_on(&self, employee_id: u64, date: NaiveDate) -> AppResult<Option<Schedule>> {
        let store = self.read()?;
        Ok(store
            .schedules
            .values()
            .find(|s| s.employee_id == employee_id && s.date_schedule == date)
            .cloned())
    }

    async fn schedule_exists(
        &self,
        employee_id: u64,
        date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<bool> {
        let store = self.read()?;
        Ok(store.schedules.values().any(|s| {
            s.employee_id == employee_id && s.date_schedule == date && Some(s.id) != exclude_id
        }))
    }

    async fn insert_schedule(&self, schedule: NewSchedule) -> AppResult<Schedule> {
        let mut store = self.write()?;
        let taken = store.schedules.values().any(|s| {
            s.employee_id == schedule.employee_id && s.date_schedule == schedule.date_schedule
        });
        if taken {
            return Err(AppError::conflict("Record already exists"));
        }
        let now = Utc::now();
        let schedule = Schedule {
            id: store.next_id(),
            employee_id: schedule.employee_id,
            shift_id: schedule.shift_id,
            created_by: schedule.created_by,
            date_schedule: schedule.date_schedule,
            status: schedule.status,
            created_at: now,
            updated_at: now,
        };
        store.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn update_schedule(&self, id: u64, changes: ScheduleChanges) -> AppResult<()> {
        let mut store = self.write()?;
        let current = store
            .schedules
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Schedule not found"))?;
        if let Some(date) = changes.date_schedule {
            let taken = store.schedules.values().any(|s| {
                s.id != id && s.employee_id == current.employee_id && s.date_schedule == date
            });
            if taken {
                return Err(AppError::conflict("Record already exists"));
            }
        }
        if let Some(schedule) = store.schedules.get_mut(&id) {
            if let Some(shift_id) = changes.shift_id {
                schedule.shift_id = shift_id;
            }
            if let Some(date) = changes.date_schedule {
                schedule.date_schedule = date;
            }
            if let Some(status) = changes.status {
                schedule.status = status;
            }
            schedule.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_schedule(&self, id: u64) -> AppResult<bool> {
        let mut store = self.write()?;
        // same refusal as the foreign keys in MySQL
        if store.schedule_referenced(id) {
            return Err(AppError::conflict("Record is still referenced by other data"));
        }
        Ok(store.schedules.remove(&id).is_some())
    }

    async fn schedule_in_use(&self, id: u64) -> AppResult<bool> {
        Ok(self.read()?.schedule_referenced(id))
    }

    async fn list_schedules(&self, query: ScheduleQuery) -> AppResult<Vec<Schedule>> {
        let store = self.read()?;
        let matches = store.schedules.values().filter(|s| match &query {
            ScheduleQuery::Employee {
                employee_id,
                from,
                until,
            } => s.employee_id == *employee_id && s.date_schedule >= *from && s.date_schedule < *until,
            ScheduleQuery::Department {
                department_id,
                date,
                status,
            } => {
                store.department_of(s.employee_id) == Some(*department_id)
                    && s.date_schedule == *date
                    && status.as_ref().is_none_or(|st| &s.status == st)
            }
        });
        Ok(sorted(matches.cloned(), |s| (s.date_schedule, s.id)))
    }
}

#[async_trait]
impl AttendanceRepository for MemoryRepository {
    async fn find_attendance(&self, schedule_id: u64, date: NaiveDate) -> AppResult<Option<Attendance>> {
        let store = self.read()?;
        Ok(store
            .attendance
            .values()
            .find(|a| a.schedule_id == schedule_id && a.date == date)
            .cloned())
    }

    async fn insert_attendance(&self, attendance: NewAttendance) -> AppResult<Attendance> {
        let mut store = self.write()?;
        let taken = store
            .attendance
            .values()
            .any(|a| a.schedule_id == attendance.schedule_id && a.date == attendance.date);
        if taken {
            return Err(AppError::conflict("Record already exists"));
        }
        let now = Utc::now();
        let record = Attendance {
            id: store.next_id(),
            schedule_id: attendance.schedule_id,
            date: attendance.date,
            clock_in: attendance.clock_in,
            clock_in_status: attendance.clock_in_status,
            clock_out: None,
            clock_out_status: None,
            duration: None,
            created_at: now,
            updated_at: now,
        };
        store.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    async fn record_check_out(&self, id: u64, check_out: CheckOut) -> AppResult<Attendance> {
        let mut store = self.write()?;
        let record = store
            .attendance
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Attendance not found"))?;
        if record.clock_out.is_some() {
            return Err(AppError::conflict("Attendance already checked out"));
        }
        record.clock_out = Some(check_out.clock_out);
        record.clock_out_status = Some(check_out.clock_out_status);
        record.duration = Some(check_out.duration);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn list_attendance(&self, employee_id: u64, query: AttendanceQuery) -> AppResult<Vec<Attendance>> {
        let store = self.read()?;
        let matches = store.attendance.values().filter(|a| {
            let owned = store
                .schedules
                .get(&a.schedule_id)
                .is_some_and(|s| s.employee_id == employee_id);
            owned
                && match &query {
                    AttendanceQuery::Dates(dates) => dates.contains(&a.date),
                    AttendanceQuery::Between(from, to) => a.date >= *from && a.date <= *to,
                    AttendanceQuery::ClockInStatus(status) => a.clock_in_status == *status,
                    AttendanceQuery::ClockOutStatus(status) => a.clock_out_status == Some(*status),
                }
        });
        Ok(sorted(matches.cloned(), |a| (a.date, a.id)))
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn insert_task(&self, task: NewTask) -> AppResult<Task> {
        let mut store = self.write()?;
        let id = store.next_id();
        let mut items = Vec::with_capacity(task.items.len());
        for description in task.items {
            items.push(TaskItem {
                id: store.next_id(),
                task_id: id,
                description,
                is_completed: false,
            });
        }
        let now = Utc::now();
        let task = Task {
            id,
            employee_id: task.employee_id,
            schedule_id: task.schedule_id,
            created_by: task.created_by,
            date_task: task.date_task,
            deadline: task.deadline,
            status: TaskStatus::NotStarted,
            message: "-".to_string(),
            feedback: "-".to_string(),
            lifecycle: TaskLifecycle::Active,
            items,
            created_at: now,
            updated_at: now,
        };
        store.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: u64) -> AppResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn latest_task(&self, employee_id: u64, date: Option<NaiveDate>) -> AppResult<Option<Task>> {
        let store = self.read()?;
        Ok(store
            .tasks
            .values()
            .filter(|t| {
                t.employee_id == employee_id
                    && t.lifecycle == TaskLifecycle::Active
                    && date.is_none_or(|d| t.date_task == d)
            })
            .max_by_key(|t| (t.created_at, t.id))
            .cloned())
    }

    async fn list_department_tasks(&self, department_id: u64, date: NaiveDate) -> AppResult<Vec<Task>> {
        let store = self.read()?;
        let matches = store.tasks.values().filter(|t| {
            t.lifecycle == TaskLifecycle::Active
                && t.date_task == date
                && store.department_of(t.employee_id) == Some(department_id)
        });
        Ok(sorted(matches.cloned(), |t| t.id))
    }

    async fn apply_checklist(
        &self,
        task_id: u64,
        checks: &[ItemCheck],
        message: Option<String>,
    ) -> AppResult<()> {
        let mut store = self.write()?;
        let task = store.task_mut(task_id)?;
        if let Some(missing) = checks
            .iter()
            .find(|c| !task.items.iter().any(|i| i.id == c.item_id))
        {
            return Err(AppError::not_found(format!(
                "Task item with ID {} not found",
                missing.item_id
            )));
        }
        for check in checks {
            if let Some(item) = task.items.iter_mut().find(|i| i.id == check.item_id) {
                item.is_completed = check.is_completed;
            }
        }
        task.status = TaskStatus::UnderReview;
        task.feedback = "-".to_string();
        if let Some(message) = message {
            task.message = message;
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn review_task(&self, id: u64, status: TaskStatus, feedback: Option<String>) -> AppResult<()> {
        let mut store = self.write()?;
        let task = store.task_mut(id)?;
        task.status = status;
        if let Some(feedback) = feedback {
            task.feedback = feedback;
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn set_task_lifecycle(&self, id: u64, lifecycle: TaskLifecycle) -> AppResult<()> {
        let mut store = self.write()?;
        let task = store.task_mut(id)?;
        task.lifecycle = lifecycle;
        task.updated_at = Utc::now();
        Ok(())
    }
}

/// A hotel with one front office (manager + receptionist), a housekeeping
/// department with its own manager, and a morning and a night shift.
pub struct Seed {
    pub front_office: u64,
    pub housekeeping: u64,
    pub manager: u64,
    pub staff: u64,
    pub other_manager: u64,
    pub morning_shift: u64,
    pub night_shift: u64,
}

pub async fn seeded() -> (MemoryRepository, Seed) {
    let repo = MemoryRepository::new();

    let department = |name: &str| DepartmentInput {
        parent_department_id: None,
        department_name: name.to_string(),
    };
    let front_office = repo.insert_department(department("Front Office")).await.unwrap().id;
    let housekeeping = repo.insert_department(department("Housekeeping")).await.unwrap().id;

    let position = |department_id, name: &str, role| PositionInput {
        department_id,
        position_name: name.to_string(),
        role,
    };
    let fo_manager = repo
        .insert_position(position(front_office, "Front Office Manager", PositionRole::Manager))
        .await
        .unwrap()
        .id;
    let receptionist = repo
        .insert_position(position(front_office, "Receptionist", PositionRole::Staff))
        .await
        .unwrap()
        .id;
    let hk_manager = repo
        .insert_position(position(housekeeping, "Housekeeping Manager", PositionRole::Manager))
        .await
        .unwrap()
        .id;

    let employee = |position_id, name: &str, email: &str| NewEmployee {
        position_id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "not-a-hash".to_string(),
        phone: "0800000000".to_string(),
    };
    let manager = repo
        .insert_employee(employee(fo_manager, "Rina", "rina@hotelqu.id"))
        .await
        .unwrap();
    let staff = repo
        .insert_employee(employee(receptionist, "Budi", "budi@hotelqu.id"))
        .await
        .unwrap();
    let other_manager = repo
        .insert_employee(employee(hk_manager, "Sari", "sari@hotelqu.id"))
        .await
        .unwrap();

    let shift = |name: &str, start: (u8, u8), end: (u8, u8)| NewShift {
        shift_type: name.to_string(),
        start_time: TimeOfDay::new(start.0, start.1).unwrap(),
        end_time: TimeOfDay::new(end.0, end.1).unwrap(),
    };
    let morning_shift = repo.insert_shift(shift("Pagi", (9, 0), (17, 0))).await.unwrap().id;
    let night_shift = repo.insert_shift(shift("Malam", (22, 0), (6, 0))).await.unwrap().id;

    (
        repo,
        Seed {
            front_office,
            housekeeping,
            manager,
            staff,
            other_manager,
            morning_shift,
            night_shift,
        },
    )
}
