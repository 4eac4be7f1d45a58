#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use licence_gateway::api::v1::extractors::AuthCtx;
use licence_gateway::middleware;
use licence_gateway::repos::error::RepoError;
use licence_gateway::services::{
    cache::{CacheClient, CacheResult},
    clock::{Clock, FixedClock},
    licence::{LicenceRecord, LicenceSource, LicenceVerifier},
    path_policy::PathPolicy,
    token::{KeycloakIntrospector, TokenCache, TokenVerifier},
};
use licence_gateway::state::GatewayState;

pub const NOW: i64 = 1_700_000_000;
pub const API_NAME: &str = "api-x";
pub const INTROSPECT_PATH: &str = "/realms/test/protocol/openid-connect/token/introspect";

#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<String, (String, Duration)>>,
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        Ok(self.entries.lock().unwrap().remove(key).map_or(0, |_| 1))
    }
}

/// Licence source double: fixed rows, or a database failure.
pub struct StaticLicences {
    rows: Vec<LicenceRecord>,
    fail: bool,
    pub queried_for: Mutex<Vec<String>>,
}

impl StaticLicences {
    pub fn new(rows: Vec<LicenceRecord>) -> Self {
        Self {
            rows,
            fail: false,
            queried_for: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl LicenceSource for StaticLicences {
    async fn licences_for_user(&self, user_uuid: &str) -> Result<Vec<LicenceRecord>, RepoError> {
        self.queried_for.lock().unwrap().push(user_uuid.to_string());
        if self.fail {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.clone())
    }
}

pub fn licence(n: u8, iat: i64, exp: i64, api_roles: &[&str]) -> LicenceRecord {
    LicenceRecord {
        uuid: format!("license-{n}"),
        type_uuid: format!("type-{n}"),
        name: format!("License {n}"),
        iat,
        exp,
        entity_uuid: "entity-1".into(),
        user_uuid: Some("user-123".into()),
        manager_uuid: None,
        created_by: "admin".into(),
        auto_renew: true,
        credential_uuid: None,
        api_roles: api_roles.iter().map(|r| r.to_string()).collect(),
        app_roles: vec![],
        apps: vec![format!("app-{n}")],
    }
}

/// license-1 current, license-2 expired, license-3 not yet valid.
pub fn three_licences() -> Vec<LicenceRecord> {
    vec![
        licence(1, NOW - 3600, NOW + 3600, &["reader"]),
        licence(2, NOW - 7200, NOW - 3600, &["admin"]),
        licence(3, NOW + 3600, NOW + 7200, &["admin"]),
    ]
}

pub fn active_payload() -> Value {
    json!({
        "active": true,
        "sub": "user-123",
        "preferred_username": "testuser",
        "email": "test@example.com",
        "aud": [API_NAME, "account"],
        "iat": NOW - 60,
        "exp": NOW + 600,
        "resource_access": {"api-x": {"roles": ["reader"]}}
    })
}

pub async fn mount_introspection(idp: &MockServer, status: u16, body: Value, calls: u64) {
    Mock::given(method("POST"))
        .and(path(INTROSPECT_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(calls)
        .mount(idp)
        .await;
}

pub struct Harness {
    pub idp: MockServer,
    pub cache: Arc<MemoryCache>,
    pub source: Arc<StaticLicences>,
    pub gateway: GatewayState,
    pub clock: Arc<dyn Clock>,
}

impl Harness {
    pub async fn new(source: StaticLicences) -> Self {
        let idp = MockServer::start().await;
        let cache = Arc::new(MemoryCache::default());
        let source = Arc::new(source);
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_epoch(NOW));

        let endpoint = Url::parse(&format!("{}{}", idp.uri(), INTROSPECT_PATH)).unwrap();
        let introspector =
            KeycloakIntrospector::new(endpoint, "gateway", "secret", Duration::from_secs(3)).unwrap();

        let tokens = TokenVerifier::new(
            TokenCache::new(cache.clone()),
            Arc::new(introspector),
            clock.clone(),
            API_NAME,
        );
        let paths = PathPolicy::new(
            vec!["/docs".into(), "/health".into()],
            vec!["/license/v1/mine".into()],
        )
        .unwrap();
        let licences = LicenceVerifier::new(source.clone(), clock.clone());

        let gateway = GatewayState::new(Arc::new(paths), Arc::new(tokens), Arc::new(licences));

        Self {
            idp,
            cache,
            source,
            gateway,
            clock,
        }
    }

    /// Probe routes behind both gateway stages; `hits` counts handler runs.
    pub fn probe_router(&self) -> (Router, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let probe = move |req: Request<Body>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let ctx = req.extensions().get::<AuthCtx>().cloned();
                Json(json!({
                    "user": ctx.as_ref().map(|c| c.user_uuid.clone()),
                    "license": ctx
                        .as_ref()
                        .and_then(|c| c.matched_license.as_ref())
                        .map(|l| l.uuid.clone()),
                    "cached_time": ctx.as_ref().and_then(|c| c.cached_time),
                }))
            }
        };

        let router = Router::new()
            .route("/docs/index.html", get(probe.clone()))
            .route("/license/v1/mine", get(probe.clone()))
            .route("/protected", get(probe));

        (middleware::auth::apply(router, self.gateway.clone()), hits)
    }
}

pub fn request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
