pub mod attendance;
pub mod department;
pub mod employee;
pub mod position;
pub mod role;
pub mod schedule;
pub mod shift;
pub mod task;
