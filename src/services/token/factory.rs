/// Factory: build `TokenVerifier` from application `Config` and the shared cache client.
use std::sync::Arc;

use crate::config::Config;
use crate::services::cache::CacheClient;
use crate::services::clock::Clock;
use crate::services::token::{
    IntrospectionError, KeycloakIntrospector, TokenCache, TokenVerifier,
};

pub fn build_token_verifier(
    config: &Config,
    cache: Arc<dyn CacheClient>,
    clock: Arc<dyn Clock>,
) -> Result<Arc<TokenVerifier>, IntrospectionError> {
    let introspector = KeycloakIntrospector::new(
        config.introspection_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
        config.introspection_timeout,
    )?;

    tracing::info!(
        endpoint = %introspector.endpoint(),
        api_name = %config.api_name,
        "token introspection configured"
    );

    Ok(Arc::new(TokenVerifier::new(
        TokenCache::new(cache),
        Arc::new(introspector),
        clock,
        config.api_name.clone(),
    )))
}
