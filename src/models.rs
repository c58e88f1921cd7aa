use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::validation::Fields;
use crate::error::AppResult;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReqDto {
    #[schema(example = "Budi Santoso")]
    pub name: Option<String>,
    #[schema(example = "budi@hotelqu.id")]
    pub email: Option<String>,
    #[schema(example = "rahasia123")]
    pub password: Option<String>,
    #[schema(example = "081298765432")]
    pub phone: Option<String>,
    /// Name of an existing position.
    #[schema(example = "Receptionist")]
    pub position: Option<String>,
}

/// A registration request that passed field validation.
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub position: String,
}

impl RegisterReqDto {
    pub fn validate(self) -> AppResult<Registration> {
        let mut fields = Fields::default();
        let name = fields.required("name", self.name.as_deref());
        let email = fields.email("email", self.email.as_deref());
        let password = fields.min_len("password", self.password.as_deref(), 6);
        let phone = fields.required("phone", self.phone.as_deref());
        let position = fields.required("position", self.position.as_deref());
        fields.finish()?;

        Ok(Registration {
            name: name.unwrap_or_default().to_string(),
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default().to_string(),
            phone: phone.unwrap_or_default().to_string(),
            position: position.unwrap_or_default().to_string(),
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "budi@hotelqu.id")]
    pub email: Option<String>,
    #[schema(example = "rahasia123")]
    pub password: Option<String>,
}

impl LoginReqDto {
    /// Returns the normalised email and the password.
    pub fn validate(&self) -> AppResult<(String, String)> {
        let mut fields = Fields::default();
        let email = fields.email("email", self.email.as_deref());
        let password = fields.required("password", self.password.as_deref());
        fields.finish()?;

        Ok((email.unwrap_or_default(), password.unwrap_or_default().to_string()))
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[schema(example = 86400)]
    pub expires_in: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub employee_id: u64,
    /// Employee email.
    pub sub: String,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn registration_reports_every_bad_field() {
        let dto = RegisterReqDto {
            name: Some("  ".into()),
            email: Some("not-an-email".into()),
            password: Some("123".into()),
            phone: None,
            position: Some("Receptionist".into()),
        };

        let Err(AppError::Validation { errors, .. }) = dto.validate() else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "password", "phone"]);
        assert_eq!(errors[1].message, "Invalid email format");
        assert_eq!(errors[2].message, "Minimum length is 6");
    }

    #[test]
    fn login_email_is_normalised() {
        let dto = LoginReqDto {
            email: Some(" Budi@HotelQu.id ".into()),
            password: Some("rahasia123".into()),
        };
        let (email, _) = dto.validate().unwrap();
        assert_eq!(email, "budi@hotelqu.id");
    }
}
