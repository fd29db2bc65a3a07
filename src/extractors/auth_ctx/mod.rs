/*!
 * Authentication context accessor
 *
 * Responsibility:
 * - 認証済みリクエストの profile を handler / 下流の middleware に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - Authenticated
 * - AuthenticationExt
 * - authentication()
 */

mod core;
mod types;

pub(crate) use self::core::attach;
pub use self::core::{AuthenticationExt, authentication};
pub use types::Authenticated;
