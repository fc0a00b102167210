use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

/// Verifies HS256 session tokens issued by the sign-in service
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }

        Ok(AuthenticatedUser {
            sub: claims.sub,
            roles: claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: u64,
        roles: Vec<&'a str>,
    }

    fn token(secret: &str, exp: u64, roles: Vec<&str>) -> String {
        let claims = TestClaims {
            sub: "user-1",
            exp,
            roles,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let user = validator
            .validate_token(&token(SECRET, future_exp(), vec!["admin"]))
            .unwrap();
        assert_eq!(user.sub, "user-1");
        assert!(user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let result = validator.validate_token(&token("other", future_exp(), vec![]));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let expired = (chrono::Utc::now().timestamp() - 3600) as u64;
        let result = validator.validate_token(&token(SECRET, expired, vec![]));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        assert!(validator.validate_token("not-a-token").is_err());
    }
}
