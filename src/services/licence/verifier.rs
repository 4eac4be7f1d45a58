//! Licence verification: `X-License-Key` → caller's licence set → current window → key match.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::clock::Clock;
use crate::services::licence::{
    model::{LicenceRecord, License},
    source::LicenceSource,
};

pub static LICENCE_HEADER: HeaderName = HeaderName::from_static("x-license-key");

#[derive(Debug, Error)]
pub enum LicenceError {
    #[error("licence header missing")]
    HeaderMissing,

    #[error("licence not found")]
    NotFound,

    #[error("licence lookup failed")]
    Source(#[from] RepoError),
}

/// Value of `X-License-Key`, if present and readable.
pub fn extract_licence(headers: &HeaderMap) -> Option<&str> {
    headers.get(&LICENCE_HEADER).and_then(|v| v.to_str().ok())
}

pub fn check_licence_header(headers: &HeaderMap) -> Result<&str, LicenceError> {
    extract_licence(headers).ok_or(LicenceError::HeaderMissing)
}

/// `key` is the uuid of some licence in the caller's (unfiltered) set.
pub fn is_licence_found(licences: Option<&[LicenceRecord]>, key: &str) -> bool {
    licences.is_some_and(|list| list.iter().any(|l| l.uuid == key))
}

/// Currently valid licences (`iat <= now < exp`), projected.
pub fn filter_licences(licences: &[LicenceRecord], now: i64) -> Vec<License> {
    licences
        .iter()
        .filter(|l| l.window().contains(now))
        .map(LicenceRecord::project)
        .collect()
}

pub struct LicenceVerifier {
    source: Arc<dyn LicenceSource>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LicenceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenceVerifier").finish_non_exhaustive()
    }
}

impl LicenceVerifier {
    pub fn new(source: Arc<dyn LicenceSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// Caller's unfiltered licence set from the configured source.
    pub async fn caller_licences(&self, user_uuid: &str) -> Result<Vec<LicenceRecord>, LicenceError> {
        Ok(self.source.licences_for_user(user_uuid).await?)
    }

    /// `filter_licences` against a single `now` snapshot.
    pub fn current_licences(&self, licences: &[LicenceRecord]) -> Vec<License> {
        filter_licences(licences, self.clock.now_epoch())
    }

    /// Match `key` among the currently valid licences only.
    pub fn match_licence(&self, licences: &[LicenceRecord], key: &str) -> Result<License, LicenceError> {
        self.current_licences(licences)
            .into_iter()
            .find(|l| l.uuid == key)
            .ok_or(LicenceError::NotFound)
    }
}
