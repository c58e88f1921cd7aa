//! Task checklists: a manager assigns, the employee ticks items off, the
//! manager reviews.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{CreatorBrief, load_employee, load_manager, require_same_department};
use crate::domain::clock::wire_date;
use crate::error::{AppError, AppResult};
use crate::model::{
    employee::{EmployeeBrief, EmployeeProfile},
    task::{ItemCheck, NewTask, Task, TaskItem, TaskLifecycle, TaskStatus},
};
use crate::repository::{EmployeeRepository, OrganizationRepository, ScheduleRepository, TaskRepository};

const NOT_A_MANAGER: &str = "You don't have permission to manage tasks";
const OTHER_DEPARTMENT: &str = "You can only manage tasks for employees in your department";

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskView {
    pub id: u64,
    pub employee: EmployeeBrief,
    pub created_by: CreatorBrief,
    pub task_items: Vec<TaskItem>,
    #[serde(with = "wire_date")]
    #[schema(value_type = String, example = "16-10-2026")]
    pub date_task: NaiveDate,
    #[serde(with = "wire_date")]
    #[schema(value_type = String, example = "16-10-2026")]
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub message: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TaskInput {
    pub employee_id: u64,
    pub schedule_id: u64,
    pub items: Vec<String>,
    pub date_task: NaiveDate,
    pub deadline: NaiveDate,
}

async fn task_view<R>(repo: &R, task: Task) -> AppResult<TaskView>
where
    R: EmployeeRepository + ?Sized,
{
    let employee = load_employee(repo, task.employee_id).await?;
    let creator = load_employee(repo, task.created_by).await?;

    Ok(TaskView {
        id: task.id,
        employee: employee.brief(),
        created_by: CreatorBrief::from(&creator),
        task_items: task.items,
        date_task: task.date_task,
        deadline: task.deadline,
        status: task.status,
        message: task.message,
        feedback: task.feedback,
        created_at: task.created_at,
        updated_at: task.updated_at,
    })
}

/// Finds a task in the expected lifecycle state; any other state reads as absent.
async fn find_in<R>(repo: &R, id: u64, lifecycle: TaskLifecycle) -> AppResult<Task>
where
    R: TaskRepository + ?Sized,
{
    let missing = match lifecycle {
        TaskLifecycle::Active => "Task not found",
        TaskLifecycle::Deleted => "Deleted task not found",
    };

    repo.find_task(id)
        .await?
        .filter(|t| t.lifecycle == lifecycle)
        .ok_or_else(|| AppError::not_found(missing))
}

/// Manager of the assignee's department, or an error.
async fn authorize_manager<R>(repo: &R, actor_id: u64, task: &Task) -> AppResult<EmployeeProfile>
where
    R: EmployeeRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, NOT_A_MANAGER).await?;
    let assignee = load_employee(repo, task.employee_id).await?;
    require_same_department(&actor, &assignee, OTHER_DEPARTMENT)?;
    Ok(actor)
}

pub async fn create_task<R>(repo: &R, actor_id: u64, input: TaskInput) -> AppResult<TaskView>
where
    R: EmployeeRepository + ScheduleRepository + TaskRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, NOT_A_MANAGER).await?;
    let employee = load_employee(repo, input.employee_id).await?;
    require_same_department(&actor, &employee, OTHER_DEPARTMENT)?;

    if input.items.is_empty() {
        return Err(AppError::validation("A task needs at least one item"));
    }

    let schedule = repo
        .find_schedule(input.schedule_id)
        .await?
        .ok_or_else(|| AppError::not_found("Schedule not found"))?;
    if schedule.employee_id != employee.id || schedule.date_schedule != input.date_task {
        warn!(
            schedule_id = schedule.id,
            employee_id = employee.id,
            date_task = %input.date_task,
            "Task date does not match a work schedule"
        );
        return Err(AppError::validation("No work schedule on that date"));
    }

    let task = repo
        .insert_task(NewTask {
            employee_id: employee.id,
            schedule_id: schedule.id,
            created_by: actor.id,
            date_task: input.date_task,
            deadline: input.deadline,
            items: input.items,
        })
        .await?;

    info!(task_id = task.id, employee_id = employee.id, created_by = actor.id, "Task created");
    task_view(repo, task).await
}

/// The employee's most recent active task, optionally on one date.
pub async fn employee_task<R>(repo: &R, employee_id: u64, date: Option<NaiveDate>) -> AppResult<Option<TaskView>>
where
    R: EmployeeRepository + TaskRepository + ?Sized,
{
    load_employee(repo, employee_id).await?;

    match repo.latest_task(employee_id, date).await? {
        Some(task) => Ok(Some(task_view(repo, task).await?)),
        None => Ok(None),
    }
}

pub async fn department_tasks<R>(
    repo: &R,
    actor_id: u64,
    department_id: Option<u64>,
    date: NaiveDate,
) -> AppResult<Vec<TaskView>>
where
    R: OrganizationRepository + EmployeeRepository + TaskRepository + ?Sized,
{
    let actor = load_manager(repo, actor_id, NOT_A_MANAGER).await?;
    let department_id = department_id.unwrap_or(actor.department_id);

    if repo.find_department(department_id).await?.is_none() {
        return Err(AppError::not_found("Department not found"));
    }

    let tasks = repo.list_department_tasks(department_id, date).await?;
    let mut views = Vec::with_capacity(tasks.len());
    for task in tasks {
        views.push(task_view(repo, task).await?);
    }
    Ok(views)
}

/// The assignee ticks items and hands the task in for review.
pub async fn checklist<R>(
    repo: &R,
    employee_id: u64,
    task_id: u64,
    checks: Vec<ItemCheck>,
    message: Option<String>,
) -> AppResult<TaskView>
where
    R: EmployeeRepository + TaskRepository + ?Sized,
{
    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    if task.employee_id != employee_id {
        warn!(task_id, employee_id, assignee = task.employee_id, "Checklist by non-assignee rejected");
        return Err(AppError::forbidden("You can only work on tasks assigned to you"));
    }

    repo.apply_checklist(task_id, &checks, message).await?;
    info!(task_id, employee_id, items = checks.len(), "Task submitted for review");

    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    task_view(repo, task).await
}

pub async fn review<R>(
    repo: &R,
    actor_id: u64,
    task_id: u64,
    status: TaskStatus,
    feedback: Option<String>,
) -> AppResult<TaskView>
where
    R: EmployeeRepository + TaskRepository + ?Sized,
{
    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    let actor = authorize_manager(repo, actor_id, &task).await?;

    repo.review_task(task_id, status, feedback).await?;
    info!(task_id, reviewed_by = actor.id, status = %status, "Task reviewed");

    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    task_view(repo, task).await
}

pub async fn delete_task<R>(repo: &R, actor_id: u64, task_id: u64) -> AppResult<()>
where
    R: EmployeeRepository + TaskRepository + ?Sized,
{
    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    let actor = authorize_manager(repo, actor_id, &task).await?;

    repo.set_task_lifecycle(task_id, TaskLifecycle::Deleted).await?;
    info!(task_id, deleted_by = actor.id, "Task deleted");
    Ok(())
}

pub async fn restore_task<R>(repo: &R, actor_id: u64, task_id: u64) -> AppResult<TaskView>
where
    R: EmployeeRepository + TaskRepository + ?Sized,
{
    let task = find_in(repo, task_id, TaskLifecycle::Deleted).await?;
    let actor = authorize_manager(repo, actor_id, &task).await?;

    repo.set_task_lifecycle(task_id, TaskLifecycle::Active).await?;
    info!(task_id, restored_by = actor.id, "Task restored");

    let task = find_in(repo, task_id, TaskLifecycle::Active).await?;
    task_view(repo, task).await
}
