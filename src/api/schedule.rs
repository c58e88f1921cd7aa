use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::api::{today, validation::Fields};
use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::schedule::{DEFAULT_SCHEDULE_STATUS, ScheduleChanges};
use crate::repository::Repository;
use crate::service::schedule::{self, DepartmentFilter, DepartmentSchedules, ScheduleInput, ScheduleView};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleReq {
    #[schema(example = 12)]
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub shift_id: Option<u64>,
    #[schema(example = "16-10-2026")]
    pub date_schedule: Option<String>,
    /// Defaults to `hadir`.
    #[schema(example = "hadir")]
    pub status: Option<String>,
}

impl CreateScheduleReq {
    pub fn validate(&self) -> AppResult<ScheduleInput> {
        let mut fields = Fields::default();
        let employee_id = fields.id("employee_id", self.employee_id);
        let shift_id = fields.id("shift_id", self.shift_id);
        let date_schedule = fields.date("date_schedule", self.date_schedule.as_deref());
        fields.finish()?;

        let status = match self.status.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => DEFAULT_SCHEDULE_STATUS.to_string(),
        };

        Ok(ScheduleInput {
            employee_id: employee_id.unwrap_or_default(),
            shift_id: shift_id.unwrap_or_default(),
            date_schedule: date_schedule.unwrap_or_default(),
            status,
        })
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateScheduleReq {
    #[schema(example = 2)]
    pub shift_id: Option<u64>,
    #[schema(example = "17-10-2026")]
    pub date_schedule: Option<String>,
    #[schema(example = "izin")]
    pub status: Option<String>,
}

impl UpdateScheduleReq {
    pub fn validate(&self) -> AppResult<ScheduleChanges> {
        let mut fields = Fields::default();
        let shift_id = match self.shift_id {
            Some(id) => fields.id("shift_id", Some(id)),
            None => None,
        };
        let date_schedule = fields.optional_date("date_schedule", self.date_schedule.as_deref());
        fields.finish()?;

        Ok(ScheduleChanges {
            shift_id,
            date_schedule,
            status: self
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DepartmentScheduleQuery {
    /// Defaults to the caller's department.
    pub department_id: Option<u64>,
    /// `DD-MM-YYYY`, defaults to today.
    pub date: Option<String>,
    pub status: Option<String>,
}

/// Create a schedule for an employee of the caller's department
#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = CreateScheduleReq,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleView),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a manager, or employee in another department"),
        (status = 404, description = "Employee or shift not found"),
        (status = 409, description = "A schedule already exists for this employee on this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn create_schedule(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<CreateScheduleReq>,
) -> AppResult<HttpResponse> {
    let input = body.validate()?;
    let view = schedule::create_schedule(repo.get_ref(), auth.employee_id, input).await?;

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Schedule created successfully",
        "schedule": view,
    })))
}

/// Update shift, date or status of a schedule
#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule id")),
    request_body = UpdateScheduleReq,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Schedule or shift not found"),
        (status = 409, description = "Another schedule already exists for this employee on this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn update_schedule(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<UpdateScheduleReq>,
) -> AppResult<HttpResponse> {
    let changes = body.validate()?;
    let view = schedule::update_schedule(repo.get_ref(), auth.employee_id, path.into_inner(), changes).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Schedule updated successfully",
        "schedule": view,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Schedule deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "Schedule already has attendance or tasks")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn delete_schedule(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    schedule::delete_schedule(repo.get_ref(), auth.employee_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Schedule deleted successfully",
    })))
}

/// The caller's schedules for this month and next
#[utoipa::path(
    get,
    path = "/api/schedules",
    responses(
        (status = 200, description = "Schedule list", body = [ScheduleView]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn my_schedules(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let views = schedule::list_employee_schedules(repo.get_ref(), auth.employee_id, today()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Schedules retrieved successfully",
        "schedules": views,
    })))
}

/// The caller's schedule for today, or null
#[utoipa::path(
    get,
    path = "/api/schedules/today",
    responses(
        (status = 200, description = "Today's schedule"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn today_schedule(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let view = schedule::today_schedule(repo.get_ref(), auth.employee_id, today()).await?;

    let message = if view.is_some() {
        "Today's schedule retrieved successfully"
    } else {
        "No schedule for today"
    };

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": message,
        "schedule": view,
    })))
}

/// Schedules of a department on one date (managers only)
#[utoipa::path(
    get,
    path = "/api/schedules/department",
    params(DepartmentScheduleQuery),
    responses(
        (status = 200, description = "Department schedules", body = DepartmentSchedules),
        (status = 400, description = "Invalid date"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn department_schedules(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    query: web::Query<DepartmentScheduleQuery>,
) -> AppResult<HttpResponse> {
    let mut fields = Fields::default();
    let date = fields.optional_date("date", query.date.as_deref());
    fields.finish()?;

    let query = query.into_inner();
    let filter = DepartmentFilter {
        department_id: query.department_id,
        date: date.unwrap_or_else(today),
        status: query.status.filter(|s| !s.trim().is_empty()),
    };
    let result = schedule::list_department_schedules(repo.get_ref(), auth.employee_id, filter).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Department schedules retrieved successfully",
        "data": result,
    })))
}
