/*
 * Responsibility
 * - domain 側のサービス群 (token / licence 検証、キャッシュ、時刻、パス分類、ロール判定)
 */
pub mod cache;
pub mod clock;
pub mod licence;
pub mod path_policy;
pub mod permission;
pub mod token;
pub mod window;
