//! identity 解決 → 認可 → profile を extensions に入れる
//!
//! 1. `IdentityResolver` が request から identity を取り出す
//! 2. `Authorizer` が identity を検証し profile を返す
//! 3. profile を request extensions に格納して inner service を呼ぶ
//!
//! どちらかが失敗した時点で `Rejection` (401) を返し、inner service は呼ばない。

use std::{
    fmt,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    http::{Request, request::Parts},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::error::{AuthError, Rejection};
use crate::extractors::auth_ctx::attach;

use super::authorizer::Authorizer;
use super::resolver::{BoxFuture, IdentityResolver};

/// Two-stage authentication layer.
///
/// Built once; cloning only bumps reference counts, so the same resolver and
/// authorizer instances serve every request (and every route the layer is
/// applied to).
pub struct Authenticator<R, A> {
    resolver: Arc<R>,
    authorizer: Arc<A>,
    rejection: Rejection,
}

impl<R, A> Clone for Authenticator<R, A> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            authorizer: Arc::clone(&self.authorizer),
            rejection: self.rejection.clone(),
        }
    }
}

impl<R, A> fmt::Debug for Authenticator<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("rejection", &self.rejection)
            .finish_non_exhaustive()
    }
}

impl<R, A> Authenticator<R, A>
where
    R: IdentityResolver,
    A: Authorizer<R::Identity>,
{
    pub fn new(resolver: R, authorizer: A) -> Self {
        Self {
            resolver: Arc::new(resolver),
            authorizer: Arc::new(authorizer),
            rejection: Rejection::default(),
        }
    }

    /// Replaces the default (empty 401) rejection.
    #[must_use]
    pub fn with_rejection(mut self, rejection: Rejection) -> Self {
        self.rejection = rejection;
        self
    }

    pub fn rejection(&self) -> &Rejection {
        &self.rejection
    }

    /// Runs both stages against `parts` without touching the request.
    pub async fn authenticate(&self, parts: &Parts) -> Result<A::Profile, AuthError> {
        let identity = self.resolver.resolve(parts).await.map_err(|err| {
            tracing::debug!(error = %err, "identity resolution failed");
            AuthError::from(err)
        })?;

        let profile = self
            .authorizer
            .authorize(parts, identity)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "authorization denied");
                AuthError::from(err)
            })?;

        Ok(profile)
    }
}

impl<S, R, A> Layer<S> for Authenticator<R, A> {
    type Service = Authenticate<S, R, A>;

    fn layer(&self, inner: S) -> Self::Service {
        Authenticate {
            inner,
            authenticator: self.clone(),
        }
    }
}

/// Service produced by [`Authenticator`].
pub struct Authenticate<S, R, A> {
    inner: S,
    authenticator: Authenticator<R, A>,
}

impl<S: Clone, R, A> Clone for Authenticate<S, R, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

impl<S: fmt::Debug, R, A> fmt::Debug for Authenticate<S, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticate")
            .field("inner", &self.inner)
            .field("authenticator", &self.authenticator)
            .finish()
    }
}

impl<S, R, A, B> Service<Request<B>> for Authenticate<S, R, A>
where
    S: Service<Request<B>> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
    R: IdentityResolver,
    A: Authorizer<R::Identity>,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        // poll_ready が通ったのは self.inner なので、そちらを future に持っていく
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let profile = match authenticator.authenticate(&parts).await {
                Ok(profile) => profile,
                Err(_) => return Ok(authenticator.rejection.to_response()),
            };

            if attach(&mut parts.extensions, profile).is_some() {
                tracing::trace!("profile from an outer authenticator shadowed");
            }

            let response = inner.call(Request::from_parts(parts, body)).await?;
            Ok(response.into_response())
        })
    }
}
