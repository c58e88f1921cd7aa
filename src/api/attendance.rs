use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::api::{today, validation::Fields};
use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::repository::Repository;
use crate::service::attendance::{self, StatusFilter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockInReq {
    #[schema(example = "08:15")]
    pub clock_in: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockOutReq {
    #[schema(example = "17:05")]
    pub clock_out: Option<String>,
}

/// Exactly one of the two must be given.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// `Tepat Waktu` or `Terlambat`
    pub clock_in_status: Option<String>,
    /// `Tepat Waktu` or `Pulang Lebih Awal`
    pub clock_out_status: Option<String>,
}

/// Check in for today's schedule
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = ClockInReq,
    responses(
        (status = 201, description = "Checked in", body = Object, example = json!({
            "error": false,
            "message": "Check-in successful",
            "attendance": {"id": 1, "date": "2026-10-16", "clock_in": "08:15", "clock_in_status": "Tepat Waktu"}
        })),
        (status = 400, description = "Malformed time or outside the check-in window"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Schedule not found for today"),
        (status = 409, description = "Already checked in today"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<ClockInReq>,
) -> AppResult<HttpResponse> {
    let mut fields = Fields::default();
    let clock_in = fields.required("clock_in", body.clock_in.as_deref());
    fields.finish()?;

    let view = attendance::check_in(
        repo.get_ref(),
        auth.employee_id,
        today(),
        clock_in.unwrap_or_default(),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Check-in successful",
        "attendance": view,
    })))
}

/// Check out of today's attendance
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = ClockOutReq,
    responses(
        (status = 200, description = "Checked out, with status and duration", body = Object, example = json!({
            "error": false,
            "message": "Check-out successful",
            "attendance": {"id": 1, "clock_out": "17:05", "clock_out_status": "Tepat Waktu", "duration": "8 jam 50 menit"}
        })),
        (status = 400, description = "Malformed time"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No schedule or no check-in for today"),
        (status = 409, description = "Already checked out today"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    body: web::Json<ClockOutReq>,
) -> AppResult<HttpResponse> {
    let mut fields = Fields::default();
    let clock_out = fields.required("clock_out", body.clock_out.as_deref());
    fields.finish()?;

    let view = attendance::check_out(
        repo.get_ref(),
        auth.employee_id,
        today(),
        clock_out.unwrap_or_default(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Check-out successful",
        "attendance": view,
    })))
}

/// Today's attendance, or null
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance (null before check-in)"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_attendance(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let view = attendance::today(repo.get_ref(), auth.employee_id, today()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Today's attendance retrieved successfully",
        "attendance": view,
    })))
}

/// Attendance of today and the two days before
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance list"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn recent_attendance(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let views = attendance::last_three_days(repo.get_ref(), auth.employee_id, today()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Attendance data retrieved successfully",
        "attendances": views,
    })))
}

/// Attendance for schedules in the current month
#[utoipa::path(
    get,
    path = "/api/attendance/month",
    responses(
        (status = 200, description = "Attendance list"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn month_attendance(auth: AuthUser, repo: web::Data<dyn Repository>) -> AppResult<HttpResponse> {
    let views = attendance::this_month(repo.get_ref(), auth.employee_id, today()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Attendance data retrieved successfully",
        "attendances": views,
    })))
}

/// Attendance filtered by clock-in or clock-out status
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Attendance list"),
        (status = 400, description = "Neither or both filters given, or unknown status"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_by_status(
    auth: AuthUser,
    repo: web::Data<dyn Repository>,
    query: web::Query<StatusQuery>,
) -> AppResult<HttpResponse> {
    let filter = StatusFilter::from_query(
        query.clock_in_status.as_deref(),
        query.clock_out_status.as_deref(),
    )?;
    let views = attendance::by_status(repo.get_ref(), auth.employee_id, filter).await?;

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Attendance data retrieved successfully",
        "attendances": views,
    })))
}
