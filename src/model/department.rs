use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = json!(null), nullable = true)]
    pub parent_department_id: Option<u64>,
    #[schema(example = "Front Office")]
    pub department_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DepartmentInput {
    #[schema(example = json!(null), nullable = true)]
    pub parent_department_id: Option<u64>,
    #[schema(example = "Front Office")]
    #[serde(default)]
    pub department_name: String,
}
