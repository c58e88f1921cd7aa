use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::clock::TimeOfDay;
use crate::domain::time_window::is_night_shift;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Shift {
    #[schema(example = 2)]
    pub id: u64,
    #[serde(rename = "type")]
    #[schema(example = "Pagi")]
    pub shift_type: String,
    #[schema(value_type = String, example = "07:00")]
    pub start_time: TimeOfDay,
    #[schema(value_type = String, example = "15:00")]
    pub end_time: TimeOfDay,
}

impl Shift {
    pub fn is_overnight(&self) -> bool {
        is_night_shift(self.end_time)
    }
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub shift_type: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}
