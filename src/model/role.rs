use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Capability level attached to a position.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PositionRole {
    #[default]
    Staff,
    Manager,
}

impl PositionRole {
    /// Schedules and tasks of a department are administered by its managers.
    pub fn can_manage_department(&self) -> bool {
        matches!(self, PositionRole::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_managers_administer() {
        assert!(PositionRole::Manager.can_manage_department());
        assert!(!PositionRole::Staff.can_manage_department());
    }

    #[test]
    fn stored_as_lowercase() {
        assert_eq!(PositionRole::Manager.as_ref(), "manager");
        assert_eq!("staff".parse::<PositionRole>(), Ok(PositionRole::Staff));
        assert!("Supervisor".parse::<PositionRole>().is_err());
    }
}
