use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::PositionRole;

/// Employee joined with position and department, as most rules need both.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "name": "Rina Wulandari",
        "email": "rina@hotelqu.id",
        "phone": "081234567890",
        "photo": null,
        "position_id": 3,
        "position_name": "Front Office Manager",
        "department_id": 1,
        "role": "manager"
    })
)]
pub struct EmployeeProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(nullable = true)]
    pub photo: Option<String>,
    pub position_id: u64,
    pub position_name: String,
    pub department_id: u64,
    pub role: PositionRole,
}

impl EmployeeProfile {
    pub fn is_manager(&self) -> bool {
        self.role.can_manage_department()
    }

    pub fn same_department(&self, other: &EmployeeProfile) -> bool {
        self.department_id == other.department_id
    }

    pub fn brief(&self) -> EmployeeBrief {
        EmployeeBrief {
            id: self.id,
            name: self.name.clone(),
            position: self.position_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeBrief {
    pub id: u64,
    pub name: String,
    pub position: String,
}

/// Login lookup row; the hash never leaves the auth module.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeCredentials {
    pub id: u64,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub position_id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.password_hash.is_none()
    }
}
