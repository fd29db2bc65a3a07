/*
 * Responsibility
 * - demo server が使う identity 解決 / 認可の具体実装
 */
pub mod client_addr;
