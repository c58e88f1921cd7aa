use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::{
        auth::bearer_token,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::{AppError, AppResult, FieldError},
    model::employee::NewEmployee,
    models::{LoginReqDto, RegisterReqDto, TokenPair, TokenType},
    repository::{EmployeeRepository, OrganizationRepository, Repository, TokenRepository},
    utils::email_registry::EmailRegistry,
};

const EMAIL_TAKEN: &str = "Email already registered";

fn token_failure(e: jsonwebtoken::errors::Error) -> AppError {
    error!(error = %e, "Failed to sign token");
    AppError::internal("token signing failed")
}

/// Signs an access/refresh pair and records the refresh `jti`.
async fn issue_pair(
    repo: &dyn Repository,
    config: &Config,
    employee_id: u64,
    email: &str,
) -> AppResult<TokenPair> {
    let access_token =
        generate_access_token(employee_id, email, &config.jwt_secret, config.access_token_ttl)
            .map_err(token_failure)?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(employee_id, email, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(token_failure)?;

    let expires_at = chrono::DateTime::from_timestamp(refresh_claims.exp as i64, 0)
        .ok_or_else(|| AppError::internal("refresh expiry out of range"))?;
    repo.store_refresh_token(employee_id, &refresh_claims.jti, expires_at)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
    })
}

/// Register a new employee account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "Employee registered", body = Object, example = json!({
            "error": false,
            "message": "Registration successful",
            "employee": {"id": 12, "name": "Budi Santoso", "email": "budi@hotelqu.id", "position": "Receptionist"}
        })),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    body: web::Json<RegisterReqDto>,
    repo: web::Data<dyn Repository>,
    registry: web::Data<EmailRegistry>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner().validate()?;
    let repo = repo.get_ref();

    if !registry.is_available(&input.email, repo).await? {
        info!(email = %input.email, "Registration rejected: email taken");
        return Err(AppError::conflict(EMAIL_TAKEN));
    }

    let position = repo
        .find_position_by_name(&input.position)
        .await?
        .ok_or_else(|| AppError::Validation {
            message: "Validation failed".to_string(),
            errors: vec![FieldError::new("position", "Position not found")],
        })?;

    let password_hash = hash_password(&input.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AppError::internal("password hashing failed")
    })?;

    let employee_id = repo
        .insert_employee(NewEmployee {
            position_id: position.id,
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash,
            phone: input.phone,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => AppError::conflict(EMAIL_TAKEN),
            other => other,
        })?;

    registry.mark_taken(&input.email).await;
    info!(employee_id, position = %position.position_name, "Employee registered");

    Ok(HttpResponse::Created().json(json!({
        "error": false,
        "message": "Registration successful",
        "employee": {
            "id": employee_id,
            "name": input.name,
            "email": input.email,
            "position": position.position_name,
        }
    })))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Access and refresh tokens", body = TokenPair),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip_all, fields(email))]
pub async fn login(
    body: web::Json<LoginReqDto>,
    repo: web::Data<dyn Repository>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    let (email, password) = body.validate()?;
    tracing::Span::current().record("email", email.as_str());

    debug!("Fetching credentials");
    let Some(employee) = repo.find_credentials(&email).await? else {
        info!("Invalid credentials: unknown email");
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    if let Err(e) = verify_password(&password, &employee.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    debug!(employee_id = employee.id, "Password verified, issuing tokens");
    let tokens = issue_pair(repo.get_ref(), &config, employee.id, &employee.email).await?;

    info!(employee_id = employee.id, "Login successful");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Login successful",
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "token_type": tokens.token_type,
        "expires_in": tokens.expires_in,
    })))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Rotated tokens", body = TokenPair),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    repo: web::Data<dyn Repository>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let token = bearer_token(&req).ok_or_else(|| AppError::unauthorized("Missing token"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::unauthorized("Invalid refresh token"));
    }

    let record = match repo.find_refresh_token(&claims.jti).await? {
        Some(r) if !r.revoked => r,
        _ => {
            warn!(employee_id = claims.employee_id, jti = %claims.jti, "Unknown or revoked refresh token");
            return Err(AppError::unauthorized("Invalid refresh token"));
        }
    };

    // lost the race against a concurrent rotation
    if !repo.revoke_refresh_token(&claims.jti).await? {
        return Err(AppError::unauthorized("Invalid refresh token"));
    }

    let tokens = issue_pair(repo.get_ref(), &config, record.employee_id, &claims.sub).await?;
    info!(employee_id = record.employee_id, "Refresh token rotated");

    Ok(HttpResponse::Ok().json(json!({
        "error": false,
        "message": "Token refreshed",
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "token_type": tokens.token_type,
        "expires_in": tokens.expires_in,
    })))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out (also when the token was unknown)")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    repo: web::Data<dyn Repository>,
    config: web::Data<Config>,
) -> HttpResponse {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::NoContent().finish();
    };

    // only refresh tokens can be revoked
    let Ok(claims) = verify_token(token, &config.jwt_secret) else {
        return HttpResponse::NoContent().finish();
    };
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    match repo.revoke_refresh_token(&claims.jti).await {
        Ok(revoked) => debug!(employee_id = claims.employee_id, revoked, "Logout"),
        Err(e) => error!(error = %e, "Failed to revoke refresh token"),
    }

    HttpResponse::NoContent().finish()
}
