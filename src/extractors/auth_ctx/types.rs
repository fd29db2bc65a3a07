/*
 * Responsibility
 * - middleware が request extensions に格納する profile の「鍵」となる型
 * - handler が受け取る Authenticated<P> の型
 *
 * Notes
 * - ProfileSlot はクレート外から生成できないため、他の extension と衝突しない
 * - profile の中身 (型) は Authenticator 構築時に固定される
 */

/// Extension slot the authenticator writes into.
///
/// Keyed by type, so one slot exists per profile type on a request. Only this
/// crate can construct it, which keeps handlers and unrelated layers from
/// forging or colliding with an authenticated profile.
#[derive(Debug, Clone)]
pub(crate) struct ProfileSlot<P>(pub(crate) P);

/// Authenticated profile handed to a handler.
///
/// ```ignore
/// async fn whoami(Authenticated(profile): Authenticated<ClientProfile>) -> String {
///     profile.addr.to_string()
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<P>(pub P);

impl<P> Authenticated<P> {
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P> std::ops::Deref for Authenticated<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
