pub mod attendance;
pub mod department;
pub mod employee;
pub mod position;
pub mod schedule;
pub mod shift;
pub mod task;
pub mod validation;

use chrono::NaiveDate;

/// Calendar date of the server's local clock; attendance days follow it.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
