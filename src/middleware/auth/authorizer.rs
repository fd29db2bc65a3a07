use axum::http::request::Parts;

use crate::error::AuthorizeError;

use super::resolver::BoxFuture;

/// Stage two: decide whether an identity is allowed in, and as whom.
///
/// The produced `Profile` is what downstream handlers read back through the
/// accessor. Its type is fixed when the authenticator is built.
pub trait Authorizer<I>: Send + Sync + 'static {
    type Profile: Clone + Send + Sync + 'static;

    fn authorize<'a>(
        &'a self,
        parts: &'a Parts,
        identity: I,
    ) -> BoxFuture<'a, Result<Self::Profile, AuthorizeError>>;
}

/// Authorizer backed by a plain function. Build it with [`authorize_fn`].
#[derive(Clone, Copy)]
pub struct AuthorizeFn<F>(F);

pub fn authorize_fn<F, I, P>(f: F) -> AuthorizeFn<F>
where
    F: Fn(&Parts, I) -> Result<P, AuthorizeError> + Send + Sync + 'static,
    P: Clone + Send + Sync + 'static,
{
    AuthorizeFn(f)
}

impl<F, I, P> Authorizer<I> for AuthorizeFn<F>
where
    F: Fn(&Parts, I) -> Result<P, AuthorizeError> + Send + Sync + 'static,
    P: Clone + Send + Sync + 'static,
{
    type Profile = P;

    fn authorize<'a>(
        &'a self,
        parts: &'a Parts,
        identity: I,
    ) -> BoxFuture<'a, Result<P, AuthorizeError>> {
        let result = (self.0)(parts, identity);
        Box::pin(async move { result })
    }
}

impl<F> std::fmt::Debug for AuthorizeFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizeFn").finish_non_exhaustive()
    }
}
