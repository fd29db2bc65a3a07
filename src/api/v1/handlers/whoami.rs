/*
 * Responsibility
 * - GET /whoami (認証済み profile をそのまま返す)
 * - authenticator の内側でしか到達しない
 */
use axum::Json;

use crate::extractors::Authenticated;
use crate::services::client_addr::ClientProfile;

pub async fn whoami(Authenticated(profile): Authenticated<ClientProfile>) -> Json<ClientProfile> {
    Json(profile)
}
