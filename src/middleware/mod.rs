/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: gateway の token / licence stage とロール制御
 * - cors / http: 全ルート共通の横断的関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
