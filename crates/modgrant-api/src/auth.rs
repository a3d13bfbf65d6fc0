//! JWT authentication middleware.
//!
//! Validates a bearer credential and injects the decoded claims as a
//! request extension. Token issuance is the external authenticator's job;
//! this layer only resolves the acting user.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::error::ErrorResponse;

/// Paths served without authentication.
const PUBLIC_PATHS: [&str; 1] = ["/health"];

/// Auth middleware configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared with the external authenticator.
    pub jwt_secret: String,
    /// Expected issuer, if the authenticator sets one.
    pub issuer: Option<String>,
}

/// Claims decoded from the bearer token.
///
/// `sub` is the user's UUID as issued by the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Layer for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthLayer {
    config: Arc<AuthConfig>,
}

impl AuthLayer {
    /// Create a new auth layer with the given configuration.
    #[must_use]
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Authentication service wrapper.
#[derive(Debug, Clone)]
pub struct AuthService<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let config = self.config.clone();
        let mut inner = self.inner.clone();
        let path = request.uri().path().to_string();

        Box::pin(async move {
            if PUBLIC_PATHS.contains(&path.as_str()) {
                return inner.call(request).await;
            }

            let auth_header = request
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok());

            let token = match auth_header {
                Some(header) if header.starts_with("Bearer ") => &header[7..],
                _ => {
                    return Ok(unauthorized_response(
                        "Missing or invalid authorization header",
                    ));
                }
            };

            match validate_jwt(token, &config) {
                Ok(claims) => {
                    request.extensions_mut().insert(claims);
                    inner.call(request).await
                }
                Err(e) => Ok(unauthorized_response(&e)),
            }
        })
    }
}

/// Decode and validate a bearer token.
fn validate_jwt(token: &str, config: &AuthConfig) -> Result<JwtClaims, String> {
    let mut validation = Validation::default();
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }

    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {e}"))
}

fn unauthorized_response(message: &str) -> Response {
    let body = Json(ErrorResponse {
        error: "unauthorized".to_string(),
        message: message.to_string(),
        details: None,
    });
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: None,
        }
    }

    fn token_for(claims: &JwtClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let claims = JwtClaims {
            sub: "5f8c1a2e-0000-4000-8000-000000000001".to_string(),
            email: Some("finance@example.com".to_string()),
            exp: (chrono::Utc::now().timestamp()) + 3600,
            iat: None,
        };

        let token = token_for(&claims, "test-secret");
        let decoded = validate_jwt(&token, &config()).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, claims.email);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = JwtClaims {
            sub: "user".to_string(),
            email: None,
            exp: (chrono::Utc::now().timestamp()) + 3600,
            iat: None,
        };

        let token = token_for(&claims, "other-secret");
        assert!(validate_jwt(&token, &config()).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = JwtClaims {
            sub: "user".to_string(),
            email: None,
            exp: (chrono::Utc::now().timestamp()) - 3600,
            iat: None,
        };

        let token = token_for(&claims, "test-secret");
        assert!(validate_jwt(&token, &config()).is_err());
    }
}
