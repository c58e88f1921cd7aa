use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpRequest, error, middleware::from_fn, web};
use anyhow::anyhow;
use tracing::debug;

use crate::{
    api::{attendance, department, employee, position, schedule, shift, task},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};

type Limiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route limiters, built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct RateLimits {
    login: Limiter,
    register: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        fn build(name: &str, requests_per_min: u32) -> anyhow::Result<Limiter> {
            let requests_per_min = requests_per_min.max(1);
            GovernorConfigBuilder::default()
                .per_millisecond(60_000 / requests_per_min as u64)
                .burst_size(requests_per_min)
                .key_extractor(PeerIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow!("invalid rate limit for {name}"))
        }

        Ok(Self {
            login: build("login", config.rate_login_per_min)?,
            register: build("register", config.rate_register_per_min)?,
            refresh: build("refresh", config.rate_refresh_per_min)?,
            protected: build("protected", config.rate_protected_per_min)?,
        })
    }
}

fn bad_request(err: impl std::fmt::Display, req: &HttpRequest) -> error::Error {
    debug!(path = %req.path(), error = %err, "Rejected malformed request");
    AppError::validation("Invalid request format").into()
}

/// Body, query and path failures use the same envelope as every other error.
pub fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| bad_request(err, req)));
}

pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::post().to(attendance::check_in))
                    .route(web::put().to(attendance::check_out))
                    .route(web::get().to(attendance::recent_attendance)),
            )
            .service(web::resource("/today").route(web::get().to(attendance::today_attendance)))
            .service(web::resource("/month").route(web::get().to(attendance::month_attendance)))
            .service(web::resource("/status").route(web::get().to(attendance::attendance_by_status))),
    );
}

pub fn schedule_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schedules")
            // /schedules
            .service(
                web::resource("")
                    .route(web::get().to(schedule::my_schedules))
                    .route(web::post().to(schedule::create_schedule)),
            )
            // fixed segments before /{id}
            .service(web::resource("/today").route(web::get().to(schedule::today_schedule)))
            .service(web::resource("/department").route(web::get().to(schedule::department_schedules)))
            // /schedules/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(schedule::update_schedule))
                    .route(web::delete().to(schedule::delete_schedule)),
            ),
    );
}

pub fn task_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            // /tasks
            .service(
                web::resource("")
                    .route(web::get().to(task::my_task))
                    .route(web::post().to(task::create_task)),
            )
            .service(web::resource("/department").route(web::get().to(task::department_tasks)))
            .service(web::resource("/status/{id}").route(web::put().to(task::review_task)))
            .service(web::resource("/{id}").route(web::delete().to(task::delete_task)))
            .service(web::resource("/{id}/checklist").route(web::put().to(task::checklist_task)))
            .service(web::resource("/{id}/restore").route(web::put().to(task::restore_task))),
    );
}

pub fn organization_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/departments")
            .service(
                web::resource("")
                    .route(web::get().to(department::list_departments))
                    .route(web::post().to(department::create_department)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(department::get_department))
                    .route(web::put().to(department::update_department))
                    .route(web::delete().to(department::delete_department)),
            ),
    )
    .service(
        web::scope("/positions")
            .service(
                web::resource("")
                    .route(web::get().to(position::list_positions))
                    .route(web::post().to(position::create_position)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(position::get_position))
                    .route(web::put().to(position::update_position))
                    .route(web::delete().to(position::delete_position)),
            ),
    )
    .service(
        web::scope("/shifts")
            .service(
                web::resource("")
                    .route(web::get().to(shift::list_shifts))
                    .route(web::post().to(shift::create_shift)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(shift::get_shift))
                    .route(web::put().to(shift::update_shift))
                    .route(web::delete().to(shift::delete_shift)),
            ),
    );
}

pub fn employee_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/user")
            .route(web::get().to(employee::get_profile))
            .route(web::put().to(employee::update_profile)),
    )
    .service(web::resource("/employees/department").route(web::get().to(employee::department_employees)));
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    extractor_configs(cfg);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&limits.register))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&limits.refresh))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&limits.protected)) // rate limiting
            .configure(attendance_routes)
            .configure(schedule_routes)
            .configure(task_routes)
            .configure(organization_routes)
            .configure(employee_routes),
    );
}

// LOGIN
//  ├─ access_token (24 h)
//  └─ refresh_token (7 days, jti stored)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ old jti revoked, new pair returned

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::testing::{bearer, state};

    #[::core::prelude::v1::test]
    fn zero_rate_still_builds_a_limiter() {
        let mut config = Config::for_tests();
        config.rate_protected_per_min = 0;
        assert!(RateLimits::from_config(&config).is_ok());
    }

    #[actix_web::test]
    async fn malformed_body_uses_the_error_envelope() {
        let (repo, seed) = state().await;
        let app = test::init_service(
            App::new()
                .app_data(repo.clone())
                .app_data(web::Data::new(Config::for_tests()))
                .configure(extractor_configs)
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(schedule_routes),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/schedules")
            .insert_header(bearer(seed.manager))
            .set_json(json!({"employee_id": "three"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": true, "message": "Invalid request format"}));

        let req = test::TestRequest::put()
            .uri("/api/schedules/abc")
            .insert_header(bearer(seed.manager))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
