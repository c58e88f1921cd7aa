use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::models::{Claims, TokenType};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn issue(
    employee_id: u64,
    email: &str,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        employee_id,
        sub: email.to_string(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(employee_id: u64, email: &str, secret: &str, ttl: usize) -> Result<String, Error> {
    issue(employee_id, email, TokenType::Access, secret, ttl).map(|(token, _)| token)
}

/// The claims are returned so the caller can persist the `jti`.
pub fn generate_refresh_token(
    employee_id: u64,
    email: &str,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(employee_id, email, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trips_identity() {
        let token = generate_access_token(7, "rina@hotelqu.id", SECRET, 60).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.employee_id, 7);
        assert_eq!(claims.sub, "rina@hotelqu.id");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_tokens_get_distinct_ids() {
        let (_, a) = generate_refresh_token(7, "rina@hotelqu.id", SECRET, 60).unwrap();
        let (_, b) = generate_refresh_token(7, "rina@hotelqu.id", SECRET, 60).unwrap();

        assert_eq!(a.token_type, TokenType::Refresh);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(7, "rina@hotelqu.id", SECRET, 60).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
