use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::api::{today, validation::Fields};
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult, FieldError};
use crate::model::task::{ItemCheck, TaskStatus};
use crate::repository::Repository;
use crate::service::task::{self, TaskInput, TaskView};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskReq {
    #[schema(example = 12)]
    pub employee_id: Option<u64>,
    #[schema(example = 40)]
    pub schedule_id: Option<u64>,
    #[schema(example = json!(["Check lobby cleanliness", "Restock brochures"]))]
    pub task_items: Option<Vec<String>>,
    #[schema(example = "16-10-2026")]
    pub date_task: Option<String>,
    #[schema(example = "16-10-2026")]
    pub deadline: Option<String>,
}

impl CreateTaskReq {
    pub fn validate(&self) -> AppResult<TaskInput> {
        let mut fields = Fields::default();
        let employee_id = fields.id("employee_id", self.employee_id);
        let schedule_id = fields.id("schedule_id", self.schedule_id);

        let items: Vec<String> = self
            .task_items
            .iter()
            .flatten()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            fields.fail("task_items", "At least one task item is required");
        }

        let date_task = fields.date("date_task", self.date_task.as_deref());
        let deadline = fields.date("deadline", self.deadline.as_deref());
        fields.finish()?;

        Ok(TaskInput {
            employee_id: employee_id.unwrap_or_default(),
            schedule_id: schedule_id.unwrap_or_default(),
            items,
            date_task: date_task.unwrap_or_default(),
            deadline: deadline.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChecklistItemReq {
    #[schema(example = 5)]
    pub id: u64,
    /// Missing means not completed.
    #[schema(example = true)]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChecklistReq {
    #[serde(default)]
    pub task_items: Vec<ChecklistItemReq>,
    #[schema(example = "Brochures restocked, lobby done")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewReq {
    pub status: Option<TaskStatus>,
    #[schema(example = "Good work")]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TaskDateQuery {
    /// `DD-MM-YYYY`
    pub date_task: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DepartmentTaskQuery {
    /// Defaults to the caller's department.
    pub department_id: Option<u64>,
    /// `DD-MM-YYYY`, defaults to today.
    pub date_task: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Assign a checklist task to an employee
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskReq,
    responses(
        (status = 201, description = "Task created", body = TaskView),
        (status = 400, description = "Validation failed or no work schedule on that date"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee or schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn create_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<CreateTaskReq>,
) -> AppResult<HttpResponse> {
    let input = body.validate()?;
    let view = task::create_task(repo.get_ref(), auth.employee_id, input).await?;

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Task created successfully",
        "task": view,
    })))
}

/// The caller's latest task, optionally for one date
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskDateQuery),
    responses(
        (status = 200, description = "Latest task or null"),
        (status = 400, description = "Invalid date")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn my_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    query: web::Query<TaskDateQuery>,
) -> AppResult<HttpResponse> {
    let mut fields = Fields::default();
    let date = fields.optional_date("date_task", query.date_task.as_deref());
    fields.finish()?;

    let view = task::employee_task(repo.get_ref(), auth.employee_id, date).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Task retrieved successfully",
        "task": view,
    })))
}

/// Active tasks of a department on one date (managers only)
#[utoipa::path(
    get,
    path = "/api/tasks/department",
    params(DepartmentTaskQuery),
    responses(
        (status = 200, description = "Task list", body = [TaskView]),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn department_tasks(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    query: web::Query<DepartmentTaskQuery>,
) -> AppResult<HttpResponse> {
    let mut fields = Fields::default();
    let date = fields.optional_date("date_task", query.date_task.as_deref());
    fields.finish()?;

    let views = task::department_tasks(
        repo.get_ref(),
        auth.employee_id,
        query.department_id,
        date.unwrap_or_else(today),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Tasks retrieved successfully",
        "tasks": views,
    })))
}

/// Tick checklist items and hand the task in for review
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/checklist",
    params(("id" = u64, Path, description = "Task id")),
    request_body = ChecklistReq,
    responses(
        (status = 200, description = "Task under review", body = TaskView),
        (status = 403, description = "Task assigned to someone else"),
        (status = 404, description = "Task or task item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn checklist_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<ChecklistReq>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let checks = body
        .task_items
        .iter()
        .map(|item| ItemCheck {
            item_id: item.id,
            is_completed: item.is_completed.unwrap_or(false),
        })
        .collect();

    let view = task::checklist(
        repo.get_ref(),
        auth.employee_id,
        path.into_inner(),
        checks,
        non_blank(body.message),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Task checklist updated successfully",
        "task": view,
    })))
}

/// Set the outcome of a task review
#[utoipa::path(
    put,
    path = "/api/tasks/status/{id}",
    params(("id" = u64, Path, description = "Task id")),
    request_body = ReviewReq,
    responses(
        (status = 200, description = "Task status updated", body = TaskView),
        (status = 400, description = "Missing or unknown status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn review_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<ReviewReq>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let Some(status) = body.status else {
        return Err(AppError::Validation {
            message: "Validation failed".to_string(),
            errors: vec![FieldError::required("status")],
        });
    };

    let view = task::review(
        repo.get_ref(),
        auth.employee_id,
        path.into_inner(),
        status,
        non_blank(body.feedback),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Task status updated successfully",
        "task": view,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = u64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn delete_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    task::delete_task(repo.get_ref(), auth.employee_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Task deleted successfully",
    })))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}/restore",
    params(("id" = u64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task restored", body = TaskView),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Deleted task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn restore_task(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let view = task::restore_task(repo.get_ref(), auth.employee_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Task restored successfully",
        "task": view,
    })))
}
