//! Authentication middleware and extractor for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that verifies Bearer tokens and injects the identity into extensions
//! - `RequireAuth` - Extractor that requires an authenticated identity
//!
//! ```text
//! Request → auth_middleware → injects VerifiedIdentity into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::VerifiedIdentity;
use crate::ports::IdentityVerifier;

/// Auth middleware state - wraps the identity verifier.
pub type AuthState = Arc<dyn IdentityVerifier>;

/// Authentication middleware that verifies Bearer tokens.
///
/// - valid token: injects `VerifiedIdentity` and continues
/// - no token: continues without an identity (`RequireAuth` rejects later)
/// - invalid token: `401` immediately
pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    match token {
        Some(token) => match verifier.verify(&token).await {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
                next.run(request).await
            }
            Err(e) => ApiError::from(e).into_response(),
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires authentication.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", identity.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub VerifiedIdentity);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityVerifier;
    use crate::domain::foundation::{AuthError, UserId};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(verifier: MockIdentityVerifier) -> Router {
        let state: AuthState = Arc::new(verifier);
        Router::new()
            .route(
                "/me",
                get(|RequireAuth(identity): RequireAuth| async move {
                    identity.user_id.as_str().to_string()
                }),
            )
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    fn request(token: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/me");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn require_auth_extracts_identity_from_extensions() {
        use axum::extract::FromRequestParts;

        let mut request: axum::http::Request<()> =
            axum::http::Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(VerifiedIdentity::new(
            UserId::new("user-123").unwrap(),
            "test@example.com",
        ));
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(identity) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.email, "test@example.com");
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let response = app(MockIdentityVerifier::new().with_test_user("t", "alice"))
            .oneshot(request(Some("t")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_rejected_by_extractor() {
        let response = app(MockIdentityVerifier::new())
            .oneshot(request(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_by_middleware() {
        let response = app(MockIdentityVerifier::new().with_test_user("t", "alice"))
            .oneshot(request(Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn verifier_outage_is_503() {
        let response = app(MockIdentityVerifier::new().with_error(AuthError::service_unavailable("down")))
            .oneshot(request(Some("t")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
