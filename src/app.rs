/*
 * Responsibility
 * - Config読み込み → resolver / authorizer 生成 → Router 組み立て
 * - Middleware の適用 (authenticator / HTTP layers)
 * - axum::serve() で起動 (peer address を ConnectInfo で渡す)
 */
use std::{net::SocketAddr, panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, auth::Authenticator};
use crate::services::client_addr::{AllowlistAuthorizer, ClientAddrResolver};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,authenticator=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では即落として気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting demo server in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    if let Some(header) = &config.identity_header {
        tracing::info!(%header, "client identity taken from forwarding header, peer address is fallback");
    }
    if config.allowed_identities.is_empty() {
        tracing::warn!("AUTH_ALLOWED_IDENTITIES is empty, every authenticated route will answer 401");
    }

    let app = build_router(&config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

pub fn build_router(config: &Config) -> Router {
    let authenticator = Authenticator::new(
        ClientAddrResolver::new(config.identity_header.clone()),
        AllowlistAuthorizer::new(config.allowed_identities.clone()),
    )
    .with_rejection(config.rejection());

    let router = Router::new().nest("/api/v1", api::v1::routes(authenticator));

    middleware::http::apply(router, config)
}
