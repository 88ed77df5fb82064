//! Authentication middleware and extractor for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates session tokens and injects the viewer into extensions
//! - `OptionalAuth` - Extractor for the viewer, if any
//!
//! Routes decide for themselves whether a missing viewer is an error, so
//! each can answer with its own message.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → OptionalAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Default name of the session cookie.
pub const DEFAULT_SESSION_COOKIE: &str = "payload-token";

/// Auth middleware state.
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn SessionValidator>,
    pub cookie_name: String,
}

impl AuthState {
    pub fn new(validator: Arc<dyn SessionValidator>, cookie_name: impl Into<String>) -> Self {
        Self {
            validator,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Pulls the session token from the request.
///
/// Accepted, in order:
/// ```text
/// Authorization: Bearer <token>
/// Authorization: JWT <token>
/// Cookie: <cookie_name>=<token>
/// ```
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("JWT ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Authentication middleware.
///
/// 1. Extracts the token from the Authorization header or session cookie
/// 2. Validates it using the `SessionValidator` port
/// 3. On success, injects `AuthenticatedUser` into request extensions
/// 4. On a missing or rejected token, continues anonymously
/// 5. When the validator backend is down, returns 503
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers(), &auth.cookie_name) else {
        return next.run(request).await;
    };

    match auth.validator.validate(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
        }
        Err(AuthError::ServiceUnavailable(msg)) => {
            tracing::error!("Auth service unavailable: {}", msg);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "Authentication service unavailable",
                    "code": "AUTH_ERROR"
                })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
        }
    }

    next.run(request).await
}

/// Extractor for optional authentication.
///
/// Returns `None` if no valid token was provided, `Some(user)` if authenticated.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl<S> axum::extract::FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = parts.extensions.get::<AuthenticatedUser>().cloned();
            Ok(OptionalAuth(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, middleware, routing::get, Router};
    use axum::http::{HeaderValue, Request as HttpRequest};
    use tower::ServiceExt;

    use crate::domain::account::UserRole;
    use crate::domain::foundation::UserId;

    /// Accepts exactly one token.
    struct StaticValidator {
        token: &'static str,
        user: AuthenticatedUser,
        down: bool,
    }

    #[async_trait]
    impl SessionValidator for StaticValidator {
        async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            if self.down {
                return Err(AuthError::service_unavailable("keys unavailable"));
            }
            if token == self.token {
                Ok(self.user.clone())
            } else {
                Err(AuthError::InvalidToken)
            }
        }
    }

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "eva@example.com", UserRole::Customer)
    }

    fn app(down: bool) -> Router {
        let state = AuthState::new(
            Arc::new(StaticValidator {
                token: "good",
                user: test_user(),
                down,
            }),
            DEFAULT_SESSION_COOKIE,
        );

        async fn whoami(OptionalAuth(user): OptionalAuth) -> String {
            user.map(|u| u.email).unwrap_or_else(|| "anonymous".to_string())
        }

        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    async fn call(app: Router, header_name: &str, value: &str) -> (StatusCode, String) {
        let request = HttpRequest::builder()
            .uri("/whoami")
            .header(header_name, value)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Extraction Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn headers(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_and_jwt_schemes_are_accepted() {
        let bearer = headers(header::AUTHORIZATION, "Bearer abc");
        let jwt = headers(header::AUTHORIZATION, "JWT abc");

        assert_eq!(extract_token(&bearer, DEFAULT_SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(extract_token(&jwt, DEFAULT_SESSION_COOKIE).as_deref(), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let basic = headers(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");

        assert_eq!(extract_token(&basic, DEFAULT_SESSION_COOKIE), None);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let cookies = headers(header::COOKIE, "theme=dark; payload-token=abc; lang=sk");

        assert_eq!(extract_token(&cookies, DEFAULT_SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(extract_token(&cookies, "other-cookie"), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_token_injects_viewer() {
        let (status, body) = call(app(false), "authorization", "Bearer good").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "eva@example.com");
    }

    #[tokio::test]
    async fn cookie_token_injects_viewer() {
        let (_, body) = call(app(false), "cookie", "payload-token=good").await;

        assert_eq!(body, "eva@example.com");
    }

    #[tokio::test]
    async fn invalid_token_continues_anonymously() {
        let (status, body) = call(app(false), "authorization", "Bearer forged").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn unavailable_validator_is_503() {
        let (status, _) = call(app(true), "authorization", "Bearer good").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn optional_auth_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptionalAuth>();
        assert_send_sync::<AuthState>();
    }
}
