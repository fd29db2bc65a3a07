/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: identity 解決 + 認可 + profile 注入
 * - http: request id / body limit / timeout / trace
 */
pub mod auth;
pub mod http;
