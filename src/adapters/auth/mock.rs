//! Mock identity verifier for testing.
//!
//! Maps fixed tokens to identities so tests never need to sign real tokens.
//!
//! # Example
//!
//! ```ignore
//! use chat_engine::adapters::auth::MockIdentityVerifier;
//!
//! let verifier = MockIdentityVerifier::new().with_test_user("token-a", "user-a");
//! let identity = verifier.verify("token-a").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId, VerifiedIdentity};
use crate::ports::IdentityVerifier;

/// Mock identity verifier.
///
/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockIdentityVerifier {
    tokens: RwLock<HashMap<String, VerifiedIdentity>>,
    /// Returned for every call when set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token that verifies as `identity`.
    pub fn with_identity(self, token: impl Into<String>, identity: VerifiedIdentity) -> Self {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.into(), identity);
        self
    }

    /// Adds a token for a user with a generated email.
    ///
    /// # Panics
    ///
    /// If `user_id` is blank.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let identity = VerifiedIdentity::new(
            UserId::new(&user_id).expect("test user id must not be blank"),
            format!("{}@test.example.com", user_id),
        );
        self.with_identity(token, identity)
    }

    /// Makes every verification fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(|e| e.into_inner()) = Some(error);
        self
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
