//! Schedule management and the one-schedule-per-employee-per-day rule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{CreatorBrief, load_employee, load_manager, require_same_department};
use crate::domain::clock::{month_start, wire_date};
use crate::error::{AppError, AppResult};
use crate::model::{
    department::Department,
    employee::EmployeeBrief,
    schedule::{NewSchedule, Schedule, ScheduleChanges, ScheduleQuery},
    shift::Shift,
};
use crate::repository::{EmployeeRepository, OrganizationRepository, ScheduleRepository, ShiftRepository};

const DUPLICATE_ON_CREATE: &str = "A schedule already exists for this employee on this date";
const DUPLICATE_ON_UPDATE: &str = "Another schedule already exists for this employee on this date";

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleView {
    pub id: u64,
    pub employee: EmployeeBrief,
    pub shift: Shift,
    #[serde(with = "wire_date")]
    #[schema(value_type = String, example = "16-10-2026")]
    pub date_schedule: NaiveDate,
    #[schema(example = "hadir")]
    pub status: String,
    pub created_by: CreatorBrief,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentSchedules {
    pub department: Department,
    pub total_employees: usize,
    #[serde(with = "wire_date")]
    #[schema(value_type = String, example = "16-10-2026")]
    pub date: NaiveDate,
    pub schedules: Vec<ScheduleView>,
}

#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub employee_id: u64,
    pub shift_id: u64,
    pub date_schedule: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct DepartmentFilter {
    pub department_id: Option<u64>,
    pub date: NaiveDate,
    pub status: Option<String>,
}

async fn find_shift<R>(repo: &R, shift_id: u64) -> AppResult<Shift>
where
    R: ShiftRepository + ?Sized,
{
    repo.find_shift(shift_id)
        .await?
        .ok_or_else(|| AppError::not_found("Shift not found"))
}

async fn find_schedule<R>(repo: &R, id: u64) -> AppResult<Schedule>
where
    R: ScheduleRepository + ?Sized,
{
    repo.find_schedule(id)
        .await?
        .ok_or_else(|| AppError::not_found("Schedule not found"))
}

/// Storage-level duplicates surface with the same message as the pre-check.
fn duplicate_as(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::conflict(message),
        other => other,
    }
}

pub(crate) async fn schedule_view<R>(repo: &R, schedule: Schedule) -> AppResult<ScheduleView>
where
    R: EmployeeRepository + ShiftRepository + ?Sized,
{
    let employee = load_employee(repo, schedule.employee_id).await?;
    let creator = load_employee(repo, schedule.created_by).await?;
    let shift = find_shift(repo, schedule.shift_id).await?;

    Ok(ScheduleView {
        id: schedule.id,
        employee: employee.brief(),
        shift,
        date_schedule: schedule.date_schedule,
        status: schedule.status,
        created_by: CreatorBrief::from(&creator),
        created_at: schedule.created_at,
        updated_at: schedule.updated_at,
    })
}

pub async fn create_schedule<R>(repo: &R, actor_id: u64, input: ScheduleInput) -> AppResult<ScheduleView>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, "You don't have permission to create schedules").await?;
    let employee = load_employee(repo, input.employee_id).await?;
    require_same_department(
        &actor,
        &employee,
        "You can only create schedules for employees in your department",
    )?;
    let shift = find_shift(repo, input.shift_id).await?;

    if repo
        .schedule_exists(employee.id, input.date_schedule, None)
        .await?
    {
        warn!(employee_id = employee.id, date = %input.date_schedule, "Duplicate schedule rejected");
        return Err(AppError::conflict(DUPLICATE_ON_CREATE));
    }

    let schedule = repo
        .insert_schedule(NewSchedule {
            employee_id: employee.id,
            shift_id: shift.id,
            created_by: actor.id,
            date_schedule: input.date_schedule,
            status: input.status,
        })
        .await
        .map_err(|e| duplicate_as(e, DUPLICATE_ON_CREATE))?;

    info!(
        schedule_id = schedule.id,
        employee_id = employee.id,
        created_by = actor.id,
        date = %schedule.date_schedule,
        "Schedule created"
    );

    Ok(ScheduleView {
        id: schedule.id,
        employee: employee.brief(),
        shift,
        date_schedule: schedule.date_schedule,
        status: schedule.status,
        created_by: CreatorBrief::from(&actor),
        created_at: schedule.created_at,
        updated_at: schedule.updated_at,
    })
}

/// Only the fields present in `changes` are written.
pub async fn update_schedule<R>(
    repo: &R,
    actor_id: u64,
    id: u64,
    changes: ScheduleChanges,
) -> AppResult<ScheduleView>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, "You don't have permission to update schedules").await?;
    let schedule = find_schedule(repo, id).await?;
    let employee = load_employee(repo, schedule.employee_id).await?;
    require_same_department(
        &actor,
        &employee,
        "You can only update schedules for employees in your department",
    )?;

    if let Some(shift_id) = changes.shift_id {
        find_shift(repo, shift_id).await?;
    }

    if let Some(date) = changes.date_schedule {
        if repo.schedule_exists(employee.id, date, Some(id)).await? {
            warn!(schedule_id = id, employee_id = employee.id, date = %date, "Schedule move onto occupied date rejected");
            return Err(AppError::conflict(DUPLICATE_ON_UPDATE));
        }
    }

    if !changes.is_empty() {
        repo.update_schedule(id, changes)
            .await
            .map_err(|e| duplicate_as(e, DUPLICATE_ON_UPDATE))?;
        info!(schedule_id = id, updated_by = actor.id, "Schedule updated");
    }

    let schedule = find_schedule(repo, id).await?;
    schedule_view(repo, schedule).await
}

pub async fn delete_schedule<R>(repo: &R, actor_id: u64, id: u64) -> AppResult<()>
where
    R: EmployeeRepository + ScheduleRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, "You don't have permission to delete schedules").await?;
    let schedule = find_schedule(repo, id).await?;
    let employee = load_employee(repo, schedule.employee_id).await?;
    require_same_department(
        &actor,
        &employee,
        "You can only delete schedules for employees in your department",
    )?;

    if repo.schedule_in_use(id).await? {
        warn!(schedule_id = id, "Delete of schedule with attendance or tasks rejected");
        return Err(AppError::conflict("Schedule already has attendance or tasks"));
    }

    if !repo.delete_schedule(id).await? {
        return Err(AppError::not_found("Schedule not found"));
    }

    info!(schedule_id = id, deleted_by = actor.id, "Schedule deleted");
    Ok(())
}

pub async fn today_schedule<R>(repo: &R, employee_id: u64, today: NaiveDate) -> AppResult<Option<ScheduleView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + ?Sized,
{
    load_employee(repo, employee_id).await?;

    match repo.find_schedule_on(employee_id, today).await? {
        Some(schedule) => Ok(Some(schedule_view(repo, schedule).await?)),
        None => Ok(None),
    }
}

/// Current and next calendar month.
pub async fn list_employee_schedules<R>(
    repo: &R,
    employee_id: u64,
    today: NaiveDate,
) -> AppResult<Vec<ScheduleView>>
where
    R: EmployeeRepository + ShiftRepository + ScheduleRepository + ?Sized,
{
    load_employee(repo, employee_id).await?;

    let schedules = repo
        .list_schedules(ScheduleQuery::Employee {
            employee_id,
            from: month_start(today, 0),
            until: month_start(today, 2),
        })
        .await?;

    let mut views = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        views.push(schedule_view(repo, schedule).await?);
    }
    Ok(views)
}

pub async fn list_department_schedules<R>(
    repo: &R,
    actor_id: u64,
    filter: DepartmentFilter,
) -> AppResult<DepartmentSchedules>
where
    R: OrganizationRepository + EmployeeRepository + ShiftRepository + ScheduleRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, "You don't have permission to access this resource").await?;
    let department_id = filter.department_id.unwrap_or(actor.department_id);

    let department = repo
        .find_department(department_id)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;
    let total_employees = repo.list_department_employees(department_id).await?.len();

    let schedules = repo
        .list_schedules(ScheduleQuery::Department {
            department_id,
            date: filter.date,
            status: filter.status,
        })
        .await?;

    let mut views = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        views.push(schedule_view(repo, schedule).await?);
    }

    Ok(DepartmentSchedules {
        department,
        total_employees,
        date: filter.date,
        schedules: views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schedule::DEFAULT_SCHEDULE_STATUS;
    use crate::repository::memory::{MemoryRepository, Seed, seeded};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn input(seed: &Seed, employee_id: u64, date: NaiveDate) -> ScheduleInput {
        ScheduleInput {
            employee_id,
            shift_id: seed.morning_shift,
            date_schedule: date,
            status: DEFAULT_SCHEDULE_STATUS.to_string(),
        }
    }

    async fn with_schedule(date: NaiveDate) -> (MemoryRepository, Seed, ScheduleView) {
        let (repo, seed) = seeded().await;
        let view = create_schedule(&repo, seed.manager, input(&seed, seed.staff, date))
            .await
            .unwrap();
        (repo, seed, view)
    }

    #[actix_web::test]
    async fn manager_schedules_own_department() {
        let (_, seed, view) = with_schedule(day(16)).await;

        assert_eq!(view.employee.id, seed.staff);
        assert_eq!(view.employee.position, "Receptionist");
        assert_eq!(view.shift.id, seed.morning_shift);
        assert_eq!(view.created_by.id, seed.manager);
        assert_eq!(view.status, "hadir");
    }

    #[actix_web::test]
    async fn second_schedule_same_day_conflicts_whatever_the_shift() {
        let (repo, seed, _) = with_schedule(day(16)).await;

        let again = ScheduleInput {
            shift_id: seed.night_shift,
            status: "izin".to_string(),
            ..input(&seed, seed.staff, day(16))
        };
        let err = create_schedule(&repo, seed.manager, again).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_ON_CREATE));
    }

    #[actix_web::test]
    async fn staff_cannot_create_schedules() {
        let (repo, seed) = seeded().await;

        let err = create_schedule(&repo, seed.staff, input(&seed, seed.staff, day(16)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(ref m) if m == "You don't have permission to create schedules"));
    }

    #[actix_web::test]
    async fn other_department_is_forbidden() {
        let (repo, seed) = seeded().await;

        let err = create_schedule(&repo, seed.other_manager, input(&seed, seed.staff, day(16)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn unknown_shift_and_employee_are_not_found() {
        let (repo, seed) = seeded().await;

        let bad_shift = ScheduleInput {
            shift_id: 9_999,
            ..input(&seed, seed.staff, day(16))
        };
        let err = create_schedule(&repo, seed.manager, bad_shift).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Shift not found"));

        let err = create_schedule(&repo, seed.manager, input(&seed, 9_999, day(16)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Employee not found"));
    }

    #[actix_web::test]
    async fn update_may_keep_its_own_date() {
        let (repo, seed, view) = with_schedule(day(16)).await;

        let changes = ScheduleChanges {
            shift_id: Some(seed.night_shift),
            date_schedule: Some(day(16)),
            status: None,
        };
        let updated = update_schedule(&repo, seed.manager, view.id, changes).await.unwrap();

        assert_eq!(updated.shift.id, seed.night_shift);
        assert_eq!(updated.date_schedule, day(16));
        // absent status is left alone
        assert_eq!(updated.status, "hadir");
    }

    #[actix_web::test]
    async fn update_onto_occupied_date_conflicts() {
        let (repo, seed, _) = with_schedule(day(16)).await;
        let other = create_schedule(&repo, seed.manager, input(&seed, seed.staff, day(17)))
            .await
            .unwrap();

        let changes = ScheduleChanges {
            date_schedule: Some(day(16)),
            ..Default::default()
        };
        let err = update_schedule(&repo, seed.manager, other.id, changes).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_ON_UPDATE));
    }

    #[actix_web::test]
    async fn delete_checks_department_then_removes() {
        let (repo, seed, view) = with_schedule(day(16)).await;

        let err = delete_schedule(&repo, seed.other_manager, view.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        delete_schedule(&repo, seed.manager, view.id).await.unwrap();
        let err = delete_schedule(&repo, seed.manager, view.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn schedule_with_attendance_is_kept() {
        use crate::repository::AttendanceRepository;

        let (repo, seed, view) = with_schedule(day(16)).await;
        crate::service::attendance::check_in(&repo, seed.staff, day(16), "08:15")
            .await
            .unwrap();

        let err = delete_schedule(&repo, seed.manager, view.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Schedule already has attendance or tasks"));

        // the store refuses on its own too
        let err = repo.delete_schedule(view.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(repo.find_schedule(view.id).await.unwrap().is_some());
        assert!(repo.find_attendance(view.id, day(16)).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn employee_listing_covers_this_and_next_month() {
        let (repo, seed) = seeded().await;
        let dates = [
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            day(1),
            day(31),
            NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        ];
        for date in dates {
            create_schedule(&repo, seed.manager, input(&seed, seed.staff, date))
                .await
                .unwrap();
        }

        let listed = list_employee_schedules(&repo, seed.staff, day(16)).await.unwrap();
        let listed: Vec<_> = listed.iter().map(|v| v.date_schedule).collect();

        assert_eq!(listed, vec![dates[1], dates[2], dates[3]]);
    }

    #[actix_web::test]
    async fn today_is_none_without_schedule() {
        let (repo, seed, view) = with_schedule(day(16)).await;

        let today = today_schedule(&repo, seed.staff, day(16)).await.unwrap();
        assert_eq!(today.map(|v| v.id), Some(view.id));
        assert!(today_schedule(&repo, seed.staff, day(17)).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn department_listing_defaults_to_actor_department() {
        let (repo, seed, view) = with_schedule(day(16)).await;

        let filter = DepartmentFilter {
            department_id: None,
            date: day(16),
            status: None,
        };
        let listing = list_department_schedules(&repo, seed.manager, filter).await.unwrap();

        assert_eq!(listing.department.id, seed.front_office);
        assert_eq!(listing.total_employees, 2);
        assert_eq!(listing.schedules.len(), 1);
        assert_eq!(listing.schedules[0].id, view.id);

        let filter = DepartmentFilter {
            department_id: None,
            date: day(16),
            status: Some("izin".to_string()),
        };
        let listing = list_department_schedules(&repo, seed.manager, filter).await.unwrap();
        assert!(listing.schedules.is_empty());
    }

    #[actix_web::test]
    async fn department_listing_is_manager_only() {
        let (repo, seed) = seeded().await;

        let filter = DepartmentFilter {
            department_id: Some(seed.housekeeping),
            date: day(16),
            status: None,
        };
        let err = list_department_schedules(&repo, seed.staff, filter).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
