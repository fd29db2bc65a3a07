/*
 * Responsibility
 * - 認証パイプラインのエラー分類 (resolution / authorization / profile 不在)
 * - 401 応答の組み立て (Rejection)
 * - IntoResponse 実装 (HTTP status / JSON error body)
 */
use std::borrow::Cow;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

/// The resolver could not determine an identity (missing or malformed credential).
#[derive(Debug, Clone, Error)]
#[error("identity resolution failed: {reason}")]
pub struct ResolveError {
    reason: Cow<'static, str>,
}

impl ResolveError {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn missing(what: &'static str) -> Self {
        Self::new(format!("missing {what}"))
    }

    pub fn malformed(what: &'static str) -> Self {
        Self::new(format!("malformed {what}"))
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The authorizer explicitly rejected a resolved identity.
#[derive(Debug, Clone, Error)]
#[error("authorization denied: {reason}")]
pub struct AuthorizeError {
    reason: Cow<'static, str>,
}

impl AuthorizeError {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Generic rejection for authorizers that don't want to say why.
    pub fn no_authentication() -> Self {
        Self::new("no authentication")
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Authorization(#[from] AuthorizeError),

    /// The accessor was used on a request that never passed the authenticator.
    #[error("no authentication")]
    NoAuthentication,
}

impl AuthError {
    pub fn is_no_authentication(&self) -> bool {
        matches!(self, Self::NoAuthentication)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            // Same shape as the middleware's default rejection.
            AuthError::Resolution(_) | AuthError::Authorization(_) => {
                Rejection::default().to_response()
            }
            // Reaching here means a route asked for a profile without the middleware in front of it.
            AuthError::NoAuthentication => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "INTERNAL_SERVER_ERROR",
                    "internal server error",
                )),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectionBody {
    #[default]
    Empty,
    Json,
}

/// How a failed resolution or authorization is written back to the client.
///
/// Always 401. By default the body is empty and no headers are added; the
/// underlying reason is never sent.
#[derive(Debug, Clone, Default)]
pub struct Rejection {
    challenge: Option<HeaderValue>,
    body: RejectionBody,
}

impl Rejection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `WWW-Authenticate: <challenge>` to every rejection.
    #[must_use]
    pub fn with_challenge(mut self, challenge: HeaderValue) -> Self {
        self.challenge = Some(challenge);
        self
    }

    #[must_use]
    pub fn with_json_body(self) -> Self {
        self.with_body(RejectionBody::Json)
    }

    #[must_use]
    pub fn with_body(mut self, body: RejectionBody) -> Self {
        self.body = body;
        self
    }

    pub fn challenge(&self) -> Option<&HeaderValue> {
        self.challenge.as_ref()
    }

    pub fn body(&self) -> RejectionBody {
        self.body
    }

    pub fn to_response(&self) -> Response {
        let mut response = match self.body {
            RejectionBody::Empty => StatusCode::UNAUTHORIZED.into_response(),
            RejectionBody::Json => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("UNAUTHORIZED", "unauthorized")),
            )
                .into_response(),
        };

        if let Some(challenge) = &self.challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge.clone());
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn stage_errors_render_like_the_default_rejection() {
        for err in [
            AuthError::from(ResolveError::missing("credential")),
            AuthError::from(AuthorizeError::no_authentication()),
        ] {
            let response = err.into_response();
            let expected = Rejection::default().to_response();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.status(), expected.status());
            assert!(response.headers().get(header::CONTENT_TYPE).is_none());
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn missing_profile_is_a_server_error() {
        let response = AuthError::NoAuthentication.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
