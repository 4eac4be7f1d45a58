/*
 * Responsibility
 * - Handler から見える「検証済みコンテキスト」の型
 * - token stage が生成して request extensions に格納し、licence stage が matched_license を埋める
 *
 * Notes
 * - introspection / licence 照合のロジックは services 側の責務
 * - handler はこの型だけを受け取る (読み取り専用)
 */
use serde_json::{Map, Value};

use crate::services::licence::License;

/// 検証済みリクエストに付与されるコンテキスト
///
/// - `user_roles` は introspection の `resource_access` をそのまま持つ
/// - `matched_license` は licence stage を通過した時だけ `Some`
/// - `token` は下流で再利用するための生値 (ログには出さない)
#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    pub user_uuid: String,
    pub user_display_name: String,
    pub user_email: String,
    pub user_audiences: Vec<String>,
    pub user_roles: Map<String, Value>,
    pub token: String,
    pub cached_time: Option<i64>,
    pub matched_license: Option<License>,
}

impl AuthCtx {
    /// Roles the matched licence grants on this API; empty without a licence.
    pub fn api_roles(&self) -> &[String] {
        self.matched_license
            .as_ref()
            .map(|l| l.api_roles.as_slice())
            .unwrap_or_default()
    }
}
