/*
 * Responsibility
 * - licence 系の request/response DTO
 * - entity 管理者向けの一覧は割り当て情報まで返す (LicenceResponse)
 * - 本人向け (/mine) は License の射影だけを返す
 */
use serde::{Deserialize, Serialize};

use crate::services::licence::LicenceRecord;

const MAX_KEY_LEN: usize = 64;

#[derive(Debug, Deserialize)]
pub struct PurchaseQuery {
    pub name: Option<String>,
}

impl PurchaseQuery {
    /// Blank `name` means "no filter".
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Licence uuids are opaque, but always short `[A-Za-z0-9-]` strings.
pub fn validate_licence_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err("license id must be 1..=64 chars");
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("license id has invalid characters");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct LicenceResponse {
    pub uuid: String,
    pub type_uuid: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub entity_uuid: String,
    pub user_uuid: Option<String>,
    pub manager_uuid: Option<String>,
    pub created_by: String,
    pub auto_renew: bool,
    pub api_roles: Vec<String>,
    pub app_roles: Vec<String>,
    pub apps: Vec<String>,
}

impl From<LicenceRecord> for LicenceResponse {
    fn from(r: LicenceRecord) -> Self {
        Self {
            uuid: r.uuid,
            type_uuid: r.type_uuid,
            name: r.name,
            iat: r.iat,
            exp: r.exp,
            entity_uuid: r.entity_uuid,
            user_uuid: r.user_uuid,
            manager_uuid: r.manager_uuid,
            created_by: r.created_by,
            auto_renew: r.auto_renew,
            api_roles: r.api_roles,
            app_roles: r.app_roles,
            apps: r.apps,
        }
    }
}
