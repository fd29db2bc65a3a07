use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{Extensions, Request, request::Parts};

use crate::error::AuthError;

use super::types::{Authenticated, ProfileSlot};

/// Returns the profile the authenticator stored on this request.
///
/// Fails with [`AuthError::NoAuthentication`] when no authenticator for `P`
/// ran in front of the caller.
pub fn authentication<P>(extensions: &Extensions) -> Result<&P, AuthError>
where
    P: Send + Sync + 'static,
{
    extensions
        .get::<ProfileSlot<P>>()
        .map(|slot| &slot.0)
        .ok_or(AuthError::NoAuthentication)
}

/// Stores `profile`, shadowing any profile of the same type set further out.
pub(crate) fn attach<P>(extensions: &mut Extensions, profile: P) -> Option<P>
where
    P: Clone + Send + Sync + 'static,
{
    extensions
        .insert(ProfileSlot(profile))
        .map(|previous| previous.0)
}

/// `.authentication::<P>()` on anything that carries request extensions.
pub trait AuthenticationExt {
    fn authentication<P>(&self) -> Result<&P, AuthError>
    where
        P: Send + Sync + 'static;
}

impl AuthenticationExt for Extensions {
    fn authentication<P>(&self) -> Result<&P, AuthError>
    where
        P: Send + Sync + 'static,
    {
        authentication(self)
    }
}

impl AuthenticationExt for Parts {
    fn authentication<P>(&self) -> Result<&P, AuthError>
    where
        P: Send + Sync + 'static,
    {
        authentication(&self.extensions)
    }
}

impl<B> AuthenticationExt for Request<B> {
    fn authentication<P>(&self) -> Result<&P, AuthError>
    where
        P: Send + Sync + 'static,
    {
        authentication(self.extensions())
    }
}

/// Handler で profile を受け取るための extractor
/// middleware が ProfileSlot を request.extensions() に insert 済みである前提
/// 見つからない場合はルーティングの設定ミスなので 500 を返す
impl<S, P> FromRequestParts<S> for Authenticated<P>
where
    S: Send + Sync,
    P: Clone + Send + Sync + 'static,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .authentication::<P>()
            .cloned()
            .map(Authenticated)
    }
}

/// `Option<Authenticated<P>>` never rejects; routes that serve both anonymous
/// and authenticated callers use this.
impl<S, P> OptionalFromRequestParts<S> for Authenticated<P>
where
    S: Send + Sync,
    P: Clone + Send + Sync + 'static,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.authentication::<P>().ok().cloned().map(Authenticated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Profile(&'static str);

    #[test]
    fn missing_profile_is_an_explicit_error() {
        let extensions = Extensions::new();

        let err = authentication::<Profile>(&extensions).unwrap_err();
        assert!(err.is_no_authentication());
    }

    #[test]
    fn attached_profile_is_returned() {
        let mut extensions = Extensions::new();
        assert!(attach(&mut extensions, Profile("USERAUTH")).is_none());

        assert_eq!(extensions.authentication::<Profile>().unwrap(), &Profile("USERAUTH"));
    }

    #[test]
    fn bare_profile_insert_is_not_visible() {
        let mut extensions = Extensions::new();
        extensions.insert(Profile("forged"));

        assert!(authentication::<Profile>(&extensions).is_err());
    }

    #[test]
    fn inner_attach_shadows_outer() {
        let mut extensions = Extensions::new();
        attach(&mut extensions, Profile("outer"));

        let previous = attach(&mut extensions, Profile("inner"));

        assert_eq!(previous, Some(Profile("outer")));
        assert_eq!(authentication::<Profile>(&extensions).unwrap(), &Profile("inner"));
    }

    #[test]
    fn profiles_of_different_types_do_not_collide() {
        let mut extensions = Extensions::new();
        attach(&mut extensions, Profile("user"));
        attach(&mut extensions, 42_u64);

        assert_eq!(authentication::<Profile>(&extensions).unwrap(), &Profile("user"));
        assert_eq!(authentication::<u64>(&extensions).unwrap(), &42);
    }
}
