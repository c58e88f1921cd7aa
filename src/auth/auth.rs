use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::models::TokenType;

/// The authenticated employee behind an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub employee_id: u64,
    pub email: String,
}

impl AuthUser {
    /// Reads `Authorization: Bearer <access token>`.
    pub fn from_headers(req: &HttpRequest, config: &Config) -> Result<Self, AppError> {
        let token = bearer_token(req).ok_or_else(|| AppError::unauthorized("Missing token"))?;

        let claims = verify_token(token, &config.jwt_secret)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::unauthorized("Invalid token type"));
        }

        Ok(AuthUser {
            employee_id: claims.employee_id,
            email: claims.sub,
        })
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected routes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::internal("Config missing"))),
        };

        ready(AuthUser::from_headers(req, config))
    }
}
