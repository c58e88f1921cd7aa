use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::api::validation::Fields;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::shift::{NewShift, Shift};
use crate::repository::{Repository, ShiftRepository};
use crate::service::load_manager;

const NOT_A_MANAGER: &str = "You don't have permission to manage shifts";

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShiftReq {
    #[serde(rename = "type")]
    #[schema(example = "Malam")]
    pub shift_type: Option<String>,
    #[schema(example = "22:00")]
    pub start_time: Option<String>,
    /// Before 07:00 marks an overnight shift.
    #[schema(example = "06:00")]
    pub end_time: Option<String>,
}

impl ShiftReq {
    pub fn validate(&self) -> AppResult<NewShift> {
        let mut fields = Fields::default();
        let shift_type = fields.required("type", self.shift_type.as_deref());
        let start_time = fields.time("start_time", self.start_time.as_deref());
        let end_time = fields.time("end_time", self.end_time.as_deref());
        fields.finish()?;

        match (shift_type, start_time, end_time) {
            (Some(shift_type), Some(start_time), Some(end_time)) => Ok(NewShift {
                shift_type: shift_type.to_string(),
                start_time,
                end_time,
            }),
            _ => Err(AppError::validation("Validation failed")),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/shifts",
    responses((status = 200, description = "All shifts", body = [Shift])),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(_auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let shifts = repo.list_shifts().await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Shifts retrieved successfully",
        "shifts": shifts,
    })))
}

#[utoipa::path(
    get,
    path = "/api/shifts/{id}",
    params(("id" = u64, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Shift", body = Shift),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn get_shift(
    _auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let shift = repo
        .find_shift(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Shift not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Shift retrieved successfully",
        "shift": shift,
    })))
}

#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = ShiftReq,
    responses(
        (status = 201, description = "Shift created", body = Shift),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<ShiftReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let input = body.validate()?;

    let shift = repo.insert_shift(input).await?;
    info!(shift_id = shift.id, overnight = shift.is_overnight(), created_by = actor.id, "Shift created");

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Shift created successfully",
        "shift": shift,
    })))
}

#[utoipa::path(
    put,
    path = "/api/shifts/{id}",
    params(("id" = u64, Path, description = "Shift id")),
    request_body = ShiftReq,
    responses(
        (status = 200, description = "Shift updated", body = Shift),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<ShiftReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();
    let input = body.validate()?;

    let shift = repo
        .update_shift(id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Shift not found"))?;
    info!(shift_id = id, updated_by = actor.id, "Shift updated");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Shift updated successfully",
        "shift": shift,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/shifts/{id}",
    params(("id" = u64, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Shift deleted"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Shift is used by schedules")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn delete_shift(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();

    if repo.find_shift(id).await?.is_none() {
        return Err(AppError::not_found("Shift not found"));
    }
    if repo.shift_in_use(id).await? {
        warn!(shift_id = id, "Delete of scheduled shift rejected");
        return Err(AppError::conflict("Shift is still used by schedules"));
    }

    repo.delete_shift(id).await?;
    info!(shift_id = id, deleted_by = actor.id, "Shift deleted");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Shift deleted successfully",
    })))
}
