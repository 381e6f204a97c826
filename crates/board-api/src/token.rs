use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use board_types::api::Claims;

/// Default lifetime of a session token.
pub const DEFAULT_TTL_HOURS: i64 = 72;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, signed with another key, or expired.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// The identity a verified token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Issues and verifies HS256 session tokens. Built once at startup from the
/// configured secret; never mutated afterwards.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            exp: (Utc::now() + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// A token is valid strictly before its `exp` second. jsonwebtoken still
    /// accepts `now == exp` with zero leeway, so that second is refused here.
    pub fn verify(&self, token: &str) -> Result<AuthUser, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?;

        if data.claims.exp as i64 <= Utc::now().timestamp() {
            return Err(TokenError::Invalid(ErrorKind::ExpiredSignature.into()));
        }

        Ok(AuthUser {
            id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    #[test]
    fn verify_returns_issued_identity() {
        let tokens = issuer("test-secret");
        let id = Uuid::new_v4();

        let token = tokens.issue(id, "alice").unwrap();
        let user = tokens.verify(&token).unwrap();

        assert_eq!(user, AuthUser { id, username: "alice".into() });
    }

    #[test]
    fn expired_token_is_invalid() {
        let tokens = TokenIssuer::new("test-secret", Duration::hours(-1));
        let token = tokens.issue(Uuid::new_v4(), "alice").unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_is_invalid_at_its_expiry_second() {
        // exp == issue second, so verification always happens at or after it
        let tokens = TokenIssuer::new("test-secret", Duration::zero());
        let token = tokens.issue(Uuid::new_v4(), "alice").unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn foreign_key_is_invalid() {
        let token = issuer("one-secret").issue(Uuid::new_v4(), "alice").unwrap();

        assert!(matches!(issuer("other-secret").verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let tokens = issuer("test-secret");
        let token = tokens.issue(Uuid::new_v4(), "alice").unwrap();
        let forged = tokens.issue(Uuid::new_v4(), "mallory").unwrap();

        // Graft mallory's claims onto alice's signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(tokens.verify(&spliced), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(issuer("s").verify("not-a-jwt"), Err(TokenError::Invalid(_))));
        assert!(matches!(issuer("s").verify(""), Err(TokenError::Invalid(_))));
    }
}
