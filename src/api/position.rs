use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::api::validation::Fields;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::{
    position::{Position, PositionInput},
    role::PositionRole,
};
use crate::repository::{OrganizationRepository, Repository};
use crate::service::load_manager;

const NOT_A_MANAGER: &str = "You don't have permission to manage positions";

#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionReq {
    #[schema(example = 1)]
    pub department_id: Option<u64>,
    #[schema(example = "Receptionist")]
    pub position_name: Option<String>,
    /// Defaults to `staff`.
    pub role: Option<PositionRole>,
}

impl PositionReq {
    pub fn validate(&self) -> AppResult<PositionInput> {
        let mut fields = Fields::default();
        let department_id = fields.id("department_id", self.department_id);
        let name = fields.required("position_name", self.position_name.as_deref());
        fields.finish()?;

        Ok(PositionInput {
            department_id: department_id.unwrap_or_default(),
            position_name: name.unwrap_or_default().to_string(),
            role: self.role.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PositionQuery {
    pub department_id: Option<u64>,
}

async fn require_department(repo: &dyn Repository, department_id: u64) -> AppResult<()> {
    if repo.find_department(department_id).await?.is_none() {
        return Err(AppError::not_found("Department not found"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/positions",
    params(PositionQuery),
    responses((status = 200, description = "Positions", body = [Position])),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn list_positions(
    _auth: AuthUser,
    repo: web::Data<dyn Repository>,
    query: web::Query<PositionQuery>,
) -> AppResult<HttpResponse> {
    let positions = repo.list_positions(query.department_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Positions retrieved successfully",
        "positions": positions,
    })))
}

#[utoipa::path(
    get,
    path = "/api/positions/{id}",
    params(("id" = u64, Path, description = "Position id")),
    responses(
        (status = 200, description = "Position", body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn get_position(
    _auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let position = repo
        .find_position(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Position not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Position retrieved successfully",
        "position": position,
    })))
}

#[utoipa::path(
    post,
    path = "/api/positions",
    request_body = PositionReq,
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn create_position(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<PositionReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let input = body.validate()?;
    require_department(repo.get_ref(), input.department_id).await?;

    let position = repo.insert_position(input).await?;
    info!(position_id = position.id, role = %position.role, created_by = actor.id, "Position created");

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Position created successfully",
        "position": position,
    })))
}

#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    params(("id" = u64, Path, description = "Position id")),
    request_body = PositionReq,
    responses(
        (status = 200, description = "Position updated", body = Position),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Position or department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn update_position(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<PositionReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();
    let input = body.validate()?;
    require_department(repo.get_ref(), input.department_id).await?;

    let position = repo
        .update_position(id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Position not found"))?;
    info!(position_id = id, updated_by = actor.id, "Position updated");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Position updated successfully",
        "position": position,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    params(("id" = u64, Path, description = "Position id")),
    responses(
        (status = 200, description = "Position deleted"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Position not found"),
        (status = 409, description = "Position still held by employees")
    ),
    security(("bearer_auth" = [])),
    tag = "Position"
)]
pub async fn delete_position(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();

    if !repo.delete_position(id).await? {
        return Err(AppError::not_found("Position not found"));
    }
    info!(position_id = id, deleted_by = actor.id, "Position deleted");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Position deleted successfully",
    })))
}
