//! Identity-provider token introspection (RFC 7662 style, Keycloak endpoint).
//!
//! One POST per call, no retries. Any transport error, timeout, non-200 status,
//! or non-object body is an `IntrospectionError`; the caller turns that into a
//! hard 500 and never caches it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::services::token::record::IntrospectionRecord;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("introspection request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("introspection request timed out")]
    Timeout,

    #[error("introspection endpoint returned HTTP {0}")]
    Status(u16),

    #[error("introspection response is not a JSON object")]
    Malformed,
}

impl From<reqwest::Error> for IntrospectionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }
}

#[async_trait]
pub trait Introspector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<IntrospectionRecord, IntrospectionError>;
}

/// Keycloak `.../protocol/openid-connect/token/introspect` client.
///
/// Client credentials are not printable via Debug.
#[derive(Clone)]
pub struct KeycloakIntrospector {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for KeycloakIntrospector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakIntrospector")
            .field("endpoint", &self.endpoint.as_str())
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl KeycloakIntrospector {
    pub fn new(
        endpoint: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IntrospectionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(IntrospectionError::Transport)?;

        Ok(Self {
            http,
            endpoint,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Introspector for KeycloakIntrospector {
    async fn introspect(&self, token: &str) -> Result<IntrospectionRecord, IntrospectionError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[
                ("token", token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IntrospectionError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| IntrospectionError::Malformed)?;

        if !body.is_object() {
            return Err(IntrospectionError::Malformed);
        }

        Ok(IntrospectionRecord::from(body))
    }
}
