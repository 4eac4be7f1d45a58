//! Where the licence stage gets the caller's licence set when no upstream attached one.
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{error::RepoError, licence_repo};
use crate::services::licence::model::LicenceRecord;

#[async_trait]
pub trait LicenceSource: Send + Sync {
    /// Every licence assigned to `user_uuid`, unfiltered by time.
    async fn licences_for_user(&self, user_uuid: &str) -> Result<Vec<LicenceRecord>, RepoError>;
}

/// PostgreSQL-backed source (`licences` table).
#[derive(Clone, Debug)]
pub struct PgLicenceSource {
    db: PgPool,
}

impl PgLicenceSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LicenceSource for PgLicenceSource {
    async fn licences_for_user(&self, user_uuid: &str) -> Result<Vec<LicenceRecord>, RepoError> {
        licence_repo::list_for_user(&self.db, user_uuid).await
    }
}
