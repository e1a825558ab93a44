//! Identity verification port.
//!
//! Turns a bearer token into a verified identity. The engine checks identity
//! once per connection; it never re-verifies per message.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, VerifiedIdentity};

/// Verifies access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed or badly signed tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a raw token (without any `Bearer ` prefix).
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_verifier_trait_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn IdentityVerifier) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn IdentityVerifier>>();
    }
}
