/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - gateway (token / licence stage) が使う依存は GatewayState にまとめる
 *   - DB を持たないので、middleware 単体でも組み立てられる
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{
    clock::Clock,
    licence::LicenceVerifier,
    path_policy::PathPolicy,
    token::TokenVerifier,
};

#[derive(Clone, Debug)]
pub struct GatewayState {
    pub paths: Arc<PathPolicy>,
    pub tokens: Arc<TokenVerifier>,
    pub licences: Arc<LicenceVerifier>,
}

impl GatewayState {
    pub fn new(
        paths: Arc<PathPolicy>,
        tokens: Arc<TokenVerifier>,
        licences: Arc<LicenceVerifier>,
    ) -> Self {
        Self {
            paths,
            tokens,
            licences,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub clock: Arc<dyn Clock>,
    pub admin_roles: Arc<[String]>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, clock: Arc<dyn Clock>, admin_roles: Vec<String>) -> Self {
        Self {
            db,
            clock,
            admin_roles: admin_roles.into(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("admin_roles", &self.admin_roles)
            .finish_non_exhaustive()
    }
}
