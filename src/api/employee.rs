use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::validation::Fields;
use crate::auth::{auth::AuthUser, password::hash_password};
use crate::error::{AppError, AppResult};
use crate::model::{
    department::Department,
    employee::{EmployeeChanges, EmployeeProfile},
    role::PositionRole,
};
use crate::repository::{EmployeeRepository, OrganizationRepository, Repository};
use crate::service::{load_employee, load_manager};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(nullable = true)]
    pub photo: Option<String>,
    #[schema(example = "Receptionist")]
    pub position: String,
    pub department: Option<Department>,
    pub role: PositionRole,
}

/// Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileReq {
    #[schema(example = "Budi Santoso")]
    pub name: Option<String>,
    #[schema(example = "081298765432")]
    pub phone: Option<String>,
    #[schema(example = "rahasia456")]
    pub password: Option<String>,
}

impl UpdateProfileReq {
    /// Returns the changes with the password still in plain text.
    pub fn validate(&self) -> AppResult<(EmployeeChanges, Option<String>)> {
        let mut fields = Fields::default();
        let mut present = |field: &str, value: &Option<String>| match value {
            Some(v) => fields.required(field, Some(v.as_str())).map(str::to_string),
            None => None,
        };
        let name = present("name", &self.name);
        let phone = present("phone", &self.phone);
        let password = match &self.password {
            Some(p) => fields.min_len("password", Some(p.as_str()), 6).map(str::to_string),
            None => None,
        };
        fields.finish()?;

        Ok((
            EmployeeChanges {
                name,
                phone,
                password_hash: None,
            },
            password,
        ))
    }
}

async fn profile_view(repo: &dyn Repository, profile: EmployeeProfile) -> AppResult<ProfileView> {
    let department = repo.find_department(profile.department_id).await?;

    Ok(ProfileView {
        id: profile.id,
        name: profile.name,
        email: profile.email,
        phone: profile.phone,
        photo: profile.photo,
        position: profile.position_name,
        department,
        role: profile.role,
    })
}

/// The caller's profile
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_profile(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let profile = load_employee(repo.get_ref(), auth.employee_id).await?;
    let view = profile_view(repo.get_ref(), profile).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Profile retrieved successfully",
        "user": view,
    })))
}

/// Update name, phone or password of the caller
#[utoipa::path(
    put,
    path = "/api/user",
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Profile updated", body = ProfileView),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_profile(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<UpdateProfileReq>,
) -> AppResult<HttpResponse> {
    let (mut changes, password) = body.validate()?;

    if let Some(password) = password {
        let hash = hash_password(&password).map_err(|e| {
            error!(error = %e, "Password hashing failed");
            AppError::internal("password hashing failed")
        })?;
        changes.password_hash = Some(hash);
    }

    if !changes.is_empty() {
        if !repo.update_employee(auth.employee_id, changes).await? {
            return Err(AppError::not_found("Employee not found"));
        }
        info!(employee_id = auth.employee_id, "Profile updated");
    }

    let profile = load_employee(repo.get_ref(), auth.employee_id).await?;
    let view = profile_view(repo.get_ref(), profile).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Profile updated successfully",
        "user": view,
    })))
}

/// Employees of the caller's department (managers only)
#[utoipa::path(
    get,
    path = "/api/employees/department",
    responses(
        (status = 200, description = "Employees", body = [EmployeeProfile]),
        (status = 403, description = "Managers only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn department_employees(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let actor = load_manager(
        repo.get_ref(),
        auth.employee_id,
        "You don't have permission to access this resource",
    )
    .await?;
    let employees = repo.list_department_employees(actor.department_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Employees retrieved successfully",
        "employees": employees,
    })))
}
