//! JWT Token Handler
//! Mission: Issue and verify signed identity tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Tokens live for a fixed hour; there is no refresh or revocation.
const TOKEN_LIFETIME_HOURS: i64 = 1;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    /// Create a new JWT handler with the process-wide signing key
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue an HS256 token carrying `{id, role}` for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::hours(TOKEN_LIFETIME_HOURS))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            id: user.id.to_string(),
            role: user.role,
            exp: expiration,
        };

        debug!("Issuing JWT for user {}", user.id);

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")
    }

    /// Verify a token and extract its claims. Bad signature, malformed
    /// payload, and expiry all fail the same way.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use uuid::Uuid;

    fn create_test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            bio: None,
            website: None,
            role: UserRole::User,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let token = handler.issue(&user).unwrap();
        assert!(!token.is_empty());

        let claims = handler.verify(&token).unwrap();
        assert_eq!(claims.id, user.id.to_string());
        assert_eq!(claims.role, user.role);
    }

    #[test]
    fn test_expiry_is_one_hour() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let token = handler.issue(&user).unwrap();
        let claims = handler.verify(&token).unwrap();

        let now = Utc::now().timestamp() as usize;
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3601);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());

        assert!(handler.verify("invalid.token.here").is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());
        let user = create_test_user();

        let token = handler1.issue(&user).unwrap();

        assert!(handler2.verify(&token).is_err());
    }
}
