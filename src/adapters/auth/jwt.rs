//! HS256 JWT session validator.
//!
//! Sessions are issued by the storefront's login flow as HMAC-signed JWTs
//! carrying `sub` (user id), `email`, `role` and `exp`. The same tokens are
//! accepted from the `Authorization` header and the session cookie.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::account::UserRole;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Claims carried by a storefront session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Validates HS256 session tokens with a shared secret.
pub struct JwtSessionValidator {
    secret: SecretString,
}

impl JwtSessionValidator {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Sign a token for the given user, valid for `ttl_secs`.
    ///
    /// Used by tooling and tests; the login flow issues production tokens.
    pub fn issue(&self, user: &AuthenticatedUser, ttl_secs: i64) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: Some(user.role.as_str().to_string()),
            exp: chrono::Utc::now().timestamp() + ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AuthError::service_unavailable(format!("Failed to sign token: {}", e)))
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_claims(token)?;

        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Invalid user ID in token");
            AuthError::InvalidToken
        })?;

        let role = claims
            .role
            .as_deref()
            .and_then(UserRole::parse)
            .unwrap_or_default();

        Ok(AuthenticatedUser::new(user_id, claims.email, role))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator").finish_non_exhaustive()
    }
}
