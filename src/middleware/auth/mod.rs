//! Request authentication middleware.
//!
//! Responsibility:
//! - Resolve an identity from the request, authorize it, attach the profile
//! - Turn either failure into a 401 before the inner handler runs
//! - Leave credential formats and policies to the caller-supplied stages

mod authenticator;
mod authorizer;
mod resolver;

use axum::Router;

pub use authenticator::{Authenticate, Authenticator};
pub use authorizer::{AuthorizeFn, Authorizer, authorize_fn};
pub use resolver::{BoxFuture, IdentityResolver, ResolveFn, resolve_fn};

/// 認証が必要な routes にだけ authenticator を掛ける。
///
/// `route_layer` を使うため、マッチしなかったリクエストは 401 ではなく 404 のまま。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::apply(v1, authenticator.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<St, R, A>(router: Router<St>, authenticator: Authenticator<R, A>) -> Router<St>
where
    St: Clone + Send + Sync + 'static,
    R: IdentityResolver,
    A: Authorizer<R::Identity>,
{
    router.route_layer(authenticator)
}
