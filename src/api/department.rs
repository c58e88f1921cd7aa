use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::api::validation::Fields;
use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::department::{Department, DepartmentInput};
use crate::repository::{OrganizationRepository, Repository};
use crate::service::load_manager;

const NOT_A_MANAGER: &str = "You don't have permission to manage departments";

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentReq {
    #[schema(example = "Front Office")]
    pub department_name: Option<String>,
    #[schema(example = json!(null), nullable = true)]
    pub parent_department_id: Option<u64>,
}

impl DepartmentReq {
    pub fn validate(&self) -> AppResult<DepartmentInput> {
        let mut fields = Fields::default();
        let name = fields.required("department_name", self.department_name.as_deref());
        fields.finish()?;

        Ok(DepartmentInput {
            parent_department_id: self.parent_department_id,
            department_name: name.unwrap_or_default().to_string(),
        })
    }
}

async fn check_parent(repo: &dyn Repository, input: &DepartmentInput, id: Option<u64>) -> AppResult<()> {
    let Some(parent) = input.parent_department_id else {
        return Ok(());
    };
    if Some(parent) == id {
        return Err(AppError::validation("A department cannot be its own parent"));
    }
    if repo.find_department(parent).await?.is_none() {
        return Err(AppError::not_found("Parent department not found"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses((status = 200, description = "All departments", body = [Department])),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(_auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let departments = repo.list_departments().await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Departments retrieved successfully",
        "departments": departments,
    })))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(("id" = u64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn get_department(
    _auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let department = repo
        .find_department(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Department retrieved successfully",
        "department": department,
    })))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = DepartmentReq,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Parent department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<DepartmentReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let input = body.validate()?;
    check_parent(repo.get_ref(), &input, None).await?;

    let department = repo.insert_department(input).await?;
    info!(department_id = department.id, created_by = actor.id, "Department created");

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Department created successfully",
        "department": department,
    })))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(("id" = u64, Path, description = "Department id")),
    request_body = DepartmentReq,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn update_department(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
    body: web::Json<DepartmentReq>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();
    let input = body.validate()?;
    check_parent(repo.get_ref(), &input, Some(id)).await?;

    let department = repo
        .update_department(id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;
    info!(department_id = id, updated_by = actor.id, "Department updated");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Department updated successfully",
        "department": department,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(("id" = u64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has positions")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let actor = load_manager(repo.get_ref(), auth.employee_id, NOT_A_MANAGER).await?;
    let id = path.into_inner();

    if !repo.delete_department(id).await? {
        return Err(AppError::not_found("Department not found"));
    }
    info!(department_id = id, deleted_by = actor.id, "Department deleted");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Department deleted successfully",
    })))
}
