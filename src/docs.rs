use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{
    attendance::{ClockInReq, ClockOutReq},
    department::DepartmentReq,
    employee::{ProfileView, UpdateProfileReq},
    position::PositionReq,
    schedule::{CreateScheduleReq, UpdateScheduleReq},
    shift::ShiftReq,
    task::{ChecklistItemReq, ChecklistReq, CreateTaskReq, ReviewReq},
};
use crate::domain::time_window::AttendanceStatus;
use crate::error::FieldError;
use crate::model::{
    department::Department,
    employee::{EmployeeBrief, EmployeeProfile},
    position::Position,
    role::PositionRole,
    shift::Shift,
    task::{TaskItem, TaskStatus},
};
use crate::models::{LoginReqDto, RegisterReqDto, TokenPair};
use crate::service::{
    CreatorBrief,
    attendance::{AttendanceView, ScheduleSummary},
    schedule::{DepartmentSchedules, ScheduleView},
    task::TaskView,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HotelQu Staff API",
        version = "1.0.0",
        description = r#"
## Hotel staff operations

Backend for hotel staff: accounts, departments and positions, shifts,
work schedules, daily attendance and task checklists.

### Attendance rules
- Check-in opens **1 hour before** shift start; after the start it is `Terlambat`.
- Check-out before shift end is `Pulang Lebih Awal`. Shifts ending before 07:00 run overnight.
- One check-in and one check-out per schedule per day.

### Formats
- Dates on the wire are `DD-MM-YYYY`; times are `HH:MM`.
- Every response carries `error` and `message`.

### Security
Everything under `/api` needs `Authorization: Bearer <access token>`.
Schedule, task and organisation changes are limited to managers of the department.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_attendance,
        crate::api::attendance::recent_attendance,
        crate::api::attendance::month_attendance,
        crate::api::attendance::attendance_by_status,

        crate::api::schedule::create_schedule,
        crate::api::schedule::update_schedule,
        crate::api::schedule::delete_schedule,
        crate::api::schedule::my_schedules,
        crate::api::schedule::today_schedule,
        crate::api::schedule::department_schedules,

        crate::api::task::create_task,
        crate::api::task::my_task,
        crate::api::task::department_tasks,
        crate::api::task::checklist_task,
        crate::api::task::review_task,
        crate::api::task::delete_task,
        crate::api::task::restore_task,

        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::create_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::position::list_positions,
        crate::api::position::get_position,
        crate::api::position::create_position,
        crate::api::position::update_position,
        crate::api::position::delete_position,

        crate::api::shift::list_shifts,
        crate::api::shift::get_shift,
        crate::api::shift::create_shift,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,

        crate::api::employee::get_profile,
        crate::api::employee::update_profile,
        crate::api::employee::department_employees
    ),
    components(
        schemas(
            RegisterReqDto,
            LoginReqDto,
            TokenPair,
            FieldError,
            ClockInReq,
            ClockOutReq,
            AttendanceStatus,
            AttendanceView,
            ScheduleSummary,
            CreateScheduleReq,
            UpdateScheduleReq,
            ScheduleView,
            DepartmentSchedules,
            CreatorBrief,
            CreateTaskReq,
            ChecklistReq,
            ChecklistItemReq,
            ReviewReq,
            TaskView,
            TaskItem,
            TaskStatus,
            DepartmentReq,
            Department,
            PositionReq,
            Position,
            PositionRole,
            ShiftReq,
            Shift,
            EmployeeProfile,
            EmployeeBrief,
            ProfileView,
            UpdateProfileReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and token rotation"),
        (name = "Attendance", description = "Daily check-in and check-out"),
        (name = "Schedule", description = "Work schedules"),
        (name = "Task", description = "Task checklists"),
        (name = "Department", description = "Departments"),
        (name = "Position", description = "Positions and their roles"),
        (name = "Shift", description = "Shift definitions"),
        (name = "Employee", description = "Profiles"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
