/*
 * Responsibility
 * - 保存されている licence の行 (LicenceRecord) と、リクエストに載せる射影 (License)
 * - 呼び出し元の未フィルタ licence 集合 (ContextLicences)
 */
use serde::{Deserialize, Serialize};

use crate::services::window::ValidityWindow;

/// Stored licence row. `user_uuid = None` means unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LicenceRecord {
    pub uuid: String,
    pub type_uuid: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub entity_uuid: String,

    #[serde(default)]
    pub user_uuid: Option<String>,
    #[serde(default)]
    pub manager_uuid: Option<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub credential_uuid: Option<String>,

    #[serde(default)]
    pub api_roles: Vec<String>,
    #[serde(default)]
    pub app_roles: Vec<String>,
    #[serde(default)]
    pub apps: Vec<String>,
}

impl LicenceRecord {
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow::new(self.iat, self.exp)
    }

    pub fn is_assigned(&self) -> bool {
        self.user_uuid.is_some()
    }

    pub fn project(&self) -> License {
        License {
            uuid: self.uuid.clone(),
            type_uuid: self.type_uuid.clone(),
            name: self.name.clone(),
            iat: self.iat,
            exp: self.exp,
            entity_uuid: self.entity_uuid.clone(),
            api_roles: self.api_roles.clone(),
            app_roles: self.app_roles.clone(),
            apps: self.apps.clone(),
        }
    }
}

/// The licence a verified request carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub uuid: String,
    pub type_uuid: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub entity_uuid: String,
    pub api_roles: Vec<String>,
    pub app_roles: Vec<String>,
    pub apps: Vec<String>,
}

/// Caller's unfiltered licence set, carried in request extensions.
#[derive(Debug, Clone, Default)]
pub struct ContextLicences(pub Vec<LicenceRecord>);
