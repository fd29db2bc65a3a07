//! Client-address identity for the demo server.
//!
//! - `ClientAddrResolver`: identity = peer address, or the configured forwarding header when
//!   running behind a trusted proxy
//! - `AllowlistAuthorizer`: identity must be in the configured allowlist
//!
//! Neither of these is a credential check; they exist to show the two stages wired end to end.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, request::Parts};
use serde::Serialize;

use crate::error::{AuthorizeError, ResolveError};
use crate::middleware::auth::{Authorizer, BoxFuture, IdentityResolver};

#[derive(Debug, Clone)]
pub struct ClientAddrResolver {
    header: Option<HeaderName>,
}

impl ClientAddrResolver {
    /// Identity is the TCP peer; client-supplied headers are ignored.
    pub fn peer() -> Self {
        Self { header: None }
    }

    /// Identity comes from `header` when present. Only for deployments where a
    /// trusted proxy sets (and overwrites) that header.
    pub fn forwarded(header: HeaderName) -> Self {
        Self {
            header: Some(header),
        }
    }

    pub fn new(header: Option<HeaderName>) -> Self {
        Self { header }
    }

    fn client_addr(&self, parts: &Parts) -> Result<IpAddr, ResolveError> {
        if let Some(value) = self.header.as_ref().and_then(|h| parts.headers.get(h)) {
            // X-Forwarded-For: client, proxy1, proxy2
            let first = value
                .to_str()
                .map_err(|_| ResolveError::malformed("forwarding header"))?
                .split(',')
                .next()
                .map(str::trim)
                .unwrap_or_default();

            return first
                .parse::<IpAddr>()
                .map_err(|_| ResolveError::malformed("forwarding header"));
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or_else(|| ResolveError::missing("client address"))
    }
}

impl IdentityResolver for ClientAddrResolver {
    type Identity = IpAddr;

    fn resolve<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<IpAddr, ResolveError>> {
        Box::pin(async move { self.client_addr(parts) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientProfile {
    pub addr: IpAddr,
}

#[derive(Debug, Clone, Default)]
pub struct AllowlistAuthorizer {
    allowed: Vec<IpAddr>,
}

impl AllowlistAuthorizer {
    pub fn new(allowed: Vec<IpAddr>) -> Self {
        Self { allowed }
    }
}

impl Authorizer<IpAddr> for AllowlistAuthorizer {
    type Profile = ClientProfile;

    fn authorize<'a>(
        &'a self,
        _parts: &'a Parts,
        addr: IpAddr,
    ) -> BoxFuture<'a, Result<ClientProfile, AuthorizeError>> {
        Box::pin(async move {
            if self.allowed.contains(&addr) {
                Ok(ClientProfile { addr })
            } else {
                Err(AuthorizeError::new(format!("{addr} is not allowed")))
            }
        })
    }
}
