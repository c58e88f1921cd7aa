use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::PositionRole;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Position {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = 1)]
    pub department_id: u64,
    #[schema(example = "Front Office Manager")]
    pub position_name: String,
    pub role: PositionRole,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PositionInput {
    #[schema(example = 1)]
    #[serde(default)]
    pub department_id: u64,
    #[schema(example = "Receptionist")]
    #[serde(default)]
    pub position_name: String,
    #[serde(default)]
    pub role: PositionRole,
}
