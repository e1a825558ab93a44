//! HS256 JWT identity verifier.
//!
//! Tokens carry `{userId, email, iat, exp}` and are signed with a shared
//! secret. Expiry is checked by `jsonwebtoken`'s default validation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, UserId, VerifiedIdentity};
use crate::ports::IdentityVerifier;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies (and, for tooling and tests, issues) HS256 tokens.
pub struct JwtIdentityVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &SecretString, token_ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
            token_ttl,
        }
    }

    /// Signs a token for `user_id` valid for the configured TTL.
    pub fn issue(&self, user_id: &UserId, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.as_str().to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::service_unavailable(format!("failed to sign token: {}", e)))
    }
}

impl std::fmt::Debug for JwtIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityVerifier")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "Token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        let user_id = UserId::new(data.claims.user_id).map_err(|_| AuthError::InvalidToken)?;
        Ok(VerifiedIdentity::new(user_id, data.claims.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(secret: &str) -> JwtIdentityVerifier {
        JwtIdentityVerifier::new(&SecretString::new(secret.to_string()), Duration::hours(24))
    }

    const SECRET: &str = "a-test-secret-that-is-long-enough-for-hs256";

    #[tokio::test]
    async fn issued_token_verifies() {
        let jwt = verifier(SECRET);
        let token = jwt.issue(&UserId::new("u-1").unwrap(), "u1@example.com").unwrap();

        let identity = jwt.verify(&token).await.unwrap();
        assert_eq!(identity.user_id.as_str(), "u-1");
        assert_eq!(identity.email, "u1@example.com");
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let token = verifier(SECRET)
            .issue(&UserId::new("u-1").unwrap(), "u1@example.com")
            .unwrap();

        let other = verifier("a-completely-different-secret-value-here");
        assert_eq!(other.verify(&token).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        assert_eq!(verifier(SECRET).verify("not.a.jwt").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let jwt = verifier(SECRET);
        let past = Utc::now() - Duration::hours(2);
        let token = jwt
            .sign(&Claims {
                user_id: "u-1".to_string(),
                email: "u1@example.com".to_string(),
                iat: past.timestamp(),
                exp: (past + Duration::minutes(5)).timestamp(),
            })
            .unwrap();

        assert_eq!(jwt.verify(&token).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn blank_user_id_claim_is_invalid() {
        let jwt = verifier(SECRET);
        let now = Utc::now();
        let token = jwt
            .sign(&Claims {
                user_id: "  ".to_string(),
                email: String::new(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            })
            .unwrap();

        assert_eq!(jwt.verify(&token).await, Err(AuthError::InvalidToken));
    }

    #[test]
    fn claims_use_camel_case() {
        let json = serde_json::to_value(Claims {
            user_id: "u".to_string(),
            email: "e".to_string(),
            iat: 1,
            exp: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u", "email": "e", "iat": 1, "exp": 2}));
    }
}
