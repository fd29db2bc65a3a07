/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、/whoami 以下は authenticator を route_layer で掛ける
 */
use std::net::IpAddr;

use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, whoami::whoami};
use crate::middleware::auth::{self, Authenticator, Authorizer, IdentityResolver};
use crate::services::client_addr::ClientProfile;

pub fn routes<R, A>(authenticator: Authenticator<R, A>) -> Router
where
    R: IdentityResolver<Identity = IpAddr>,
    A: Authorizer<IpAddr, Profile = ClientProfile>,
{
    let protected = auth::apply(Router::new().route("/whoami", get(whoami)), authenticator);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
}
