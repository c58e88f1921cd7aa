use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;

/// Rejects requests without a valid access token and stores the
/// [`AuthUser`] in the request extensions for handlers.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| AppError::internal("App config missing"))?;

    let auth_user = match AuthUser::from_headers(req.request(), &config) {
        Ok(user) => user,
        Err(e) => {
            debug!(path = %req.path(), error = %e, "Rejected unauthenticated request");
            let resp = e.error_response();
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
