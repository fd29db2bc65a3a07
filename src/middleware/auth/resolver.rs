use std::{future::Future, pin::Pin};

use axum::http::request::Parts;

use crate::error::ResolveError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Stage one: work out who is calling.
///
/// Implementations are built once and shared by every request, so they must
/// tolerate concurrent calls without interior mutation they don't synchronize
/// themselves.
///
/// Returns:
/// - Ok(identity) => passed on to the authorizer
/// - Err(_)       => request is rejected with 401, nothing else runs
pub trait IdentityResolver: Send + Sync + 'static {
    type Identity: Send + 'static;

    fn resolve<'a>(
        &'a self,
        parts: &'a Parts,
    ) -> BoxFuture<'a, Result<Self::Identity, ResolveError>>;
}

/// Resolver backed by a plain function. Build it with [`resolve_fn`].
#[derive(Clone, Copy)]
pub struct ResolveFn<F>(F);

/// Wraps a synchronous function as an [`IdentityResolver`].
///
/// ```ignore
/// let resolver = resolve_fn(|_parts| Ok("192.0.2.1".to_string()));
/// ```
pub fn resolve_fn<F, I>(f: F) -> ResolveFn<F>
where
    F: Fn(&Parts) -> Result<I, ResolveError> + Send + Sync + 'static,
    I: Send + 'static,
{
    ResolveFn(f)
}

impl<F, I> IdentityResolver for ResolveFn<F>
where
    F: Fn(&Parts) -> Result<I, ResolveError> + Send + Sync + 'static,
    I: Send + 'static,
{
    type Identity = I;

    fn resolve<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<I, ResolveError>> {
        let result = (self.0)(parts);
        Box::pin(async move { result })
    }
}

impl<F> std::fmt::Debug for ResolveFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveFn").finish_non_exhaustive()
    }
}
