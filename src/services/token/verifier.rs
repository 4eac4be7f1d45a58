//! Bearer token verification: header → cache → introspection → gates → `AuthCtx`.
//!
//! Gates run in a fixed order (Active, then Audience) so an expired token
//! always reports `TokenInactive`, whatever its audience.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::services::clock::Clock;
use crate::services::token::{
    cache::TokenCache,
    fingerprint,
    introspect::{IntrospectionError, Introspector},
    record::IntrospectionRecord,
};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing or invalid bearer token")]
    MissingOrInvalidToken,

    #[error("token is not active")]
    Inactive,

    #[error("token audience does not include this api")]
    AudienceMismatch,

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}

/// `Authorization: Bearer <token>`: case-sensitive scheme, one space, and a
/// non-empty token without whitespace.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, TokenError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(TokenError::MissingOrInvalidToken)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(TokenError::MissingOrInvalidToken);
    }

    Ok(token)
}

/// Map a validated record into the per-request context.
pub fn decorate(token: &str, record: IntrospectionRecord) -> AuthCtx {
    let user_audiences = record.audiences();

    AuthCtx {
        user_uuid: record.sub.unwrap_or_default(),
        user_display_name: record.preferred_username.unwrap_or_default(),
        user_email: record.email.unwrap_or_default(),
        user_audiences,
        user_roles: record.resource_access,
        token: token.to_string(),
        cached_time: record.cached_time,
        matched_license: None,
    }
}

pub struct TokenVerifier {
    cache: TokenCache,
    introspector: Arc<dyn Introspector>,
    clock: Arc<dyn Clock>,
    api_name: String,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("cache", &self.cache)
            .field("api_name", &self.api_name)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        cache: TokenCache,
        introspector: Arc<dyn Introspector>,
        clock: Arc<dyn Clock>,
        api_name: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            introspector,
            clock,
            api_name: api_name.into(),
        }
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Cache-aside verification: a hit is used as stored, a miss introspects
    /// and writes back.
    pub async fn verify(&self, token: &str) -> Result<AuthCtx, TokenError> {
        let record = match self.cache.lookup(token).await {
            Some(record) => record,
            None => self.introspect_and_store(token).await?,
        };

        self.accept(token, record)
    }

    /// Forced refresh: evict, introspect unconditionally, then validate.
    pub async fn refresh(&self, token: &str) -> Result<AuthCtx, TokenError> {
        self.cache.evict(token).await;
        let record = self.introspect_and_store(token).await?;

        self.accept(token, record)
    }

    /// Active gate, then Audience gate.
    pub fn check_token(&self, record: &IntrospectionRecord, now: i64) -> Result<(), TokenError> {
        if !record.is_active_at(now) {
            return Err(TokenError::Inactive);
        }
        if !record.audience_contains(&self.api_name) {
            return Err(TokenError::AudienceMismatch);
        }
        Ok(())
    }

    async fn introspect_and_store(&self, token: &str) -> Result<IntrospectionRecord, TokenError> {
        let mut record = self.introspector.introspect(token).await.map_err(|err| {
            tracing::warn!(token = %fingerprint(token), error = %err, "token introspection failed");
            err
        })?;

        let now = self.clock.now_epoch();
        self.cache.store(token, &mut record, now).await;

        Ok(record)
    }

    fn accept(&self, token: &str, record: IntrospectionRecord) -> Result<AuthCtx, TokenError> {
        self.check_token(&record, self.clock.now_epoch())?;
        Ok(decorate(token, record))
    }
}
