//! Token decoding and signature verification.
//!
//! Time-window checks are delegated to [`validate_claims`] with a
//! caller-supplied `now`, so the whole path stays deterministic under test.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token is malformed or its signature does not verify")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync + 'static {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 validator over a shared secret.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The claims carry RFC 3339 `issued_at`/`expires_at` instead of the
        // numeric registered claims, so the library's time checks are turned
        // off and `validate_claims` does them against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Mint an HS256 token for the given claims. Used by token issuance and by
/// integration tests.
pub fn encode_hs256(secret: impl AsRef<[u8]>, claims: &JwtClaims) -> Result<String, JwtError> {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrincipalId, Role};
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            roles: vec![Role::new("librarian")],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn round_trips_a_valid_token() {
        let now = Utc::now();
        let claims = claims_at(now);
        let token = encode_hs256(b"test-secret", &claims).unwrap();

        let validator = Hs256JwtValidator::new(b"test-secret");
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let now = Utc::now();
        let token = encode_hs256(b"other-secret", &claims_at(now)).unwrap();

        let validator = Hs256JwtValidator::new(b"test-secret");
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_an_expired_token() {
        let now = Utc::now();
        let token = encode_hs256(b"test-secret", &claims_at(now)).unwrap();

        let validator = Hs256JwtValidator::new(b"test-secret");
        assert!(matches!(
            validator.validate(&token, now + Duration::hours(2)),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn rejects_garbage_input() {
        let validator = Hs256JwtValidator::new(b"test-secret");
        assert!(matches!(
            validator.validate("not-a-jwt", Utc::now()),
            Err(JwtError::Invalid(_))
        ));
    }
}
