//! Business rules. Every operation takes the repository it needs and the id
//! of the authenticated employee; nothing here knows about HTTP.

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::employee::EmployeeProfile;
use crate::repository::EmployeeRepository;

pub mod attendance;
pub mod schedule;
pub mod task;

/// Who created a schedule or task.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorBrief {
    pub id: u64,
    pub name: String,
}

impl From<&EmployeeProfile> for CreatorBrief {
    fn from(p: &EmployeeProfile) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

pub(crate) async fn load_employee<R>(repo: &R, employee_id: u64) -> AppResult<EmployeeProfile>
where
    R: EmployeeRepository + ?Sized,
{
    repo.find_profile(employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))
}

/// Loads the actor and rejects non-managers with `denied`.
pub(crate) async fn load_manager<R>(repo: &R, actor_id: u64, denied: &str) -> AppResult<EmployeeProfile>
where
    R: EmployeeRepository + ?Sized,
{
    let actor = load_employee(repo, actor_id).await?;
    if !actor.is_manager() {
        warn!(actor_id, position = %actor.position_name, "Manager capability required");
        return Err(AppError::forbidden(denied));
    }
    Ok(actor)
}

pub(crate) fn require_same_department(
    actor: &EmployeeProfile,
    target: &EmployeeProfile,
    denied: &str,
) -> AppResult<()> {
    if !actor.same_department(target) {
        warn!(
            actor_id = actor.id,
            target_id = target.id,
            actor_department = actor.department_id,
            target_department = target.department_id,
            "Cross-department access rejected"
        );
        return Err(AppError::forbidden(denied));
    }
    Ok(())
}
