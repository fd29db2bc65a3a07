//! Two-stage request authentication for axum / tower services.
//!
//! An [`Authenticator`] is built from an [`IdentityResolver`] and an
//! [`Authorizer`]. Layered over a route, it resolves who is calling, asks the
//! authorizer for a profile, and stores that profile on the request before the
//! inner handler runs. Either stage failing answers 401 and the handler never
//! sees the request. Handlers read the profile back with [`Authenticated`] or
//! [`authentication`].
//!
//! ```ignore
//! use authenticator::{Authenticated, Authenticator, authorize_fn, resolve_fn};
//!
//! let authenticator = Authenticator::new(
//!     resolve_fn(|_parts| Ok("192.0.2.1".to_string())),
//!     authorize_fn(|_parts, _id: String| Ok("USERAUTH")),
//! );
//!
//! let app = Router::new()
//!     .route("/get", get(|Authenticated(p): Authenticated<&'static str>| async move { p }))
//!     .route_layer(authenticator);
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod services;

pub use error::{AuthError, AuthorizeError, Rejection, RejectionBody, ResolveError};
pub use extractors::{Authenticated, AuthenticationExt, authentication};
pub use middleware::auth::{
    Authenticate, Authenticator, AuthorizeFn, Authorizer, BoxFuture, IdentityResolver, ResolveFn,
    authorize_fn, resolve_fn,
};
