/*
 * Responsibility
 * - 環境変数の読み込み (DATABASE_URL, API_NAME, Keycloak, Redis, パス分類など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 * - 解析は from_vars() に閉じ込め、テストでは process env を触らない
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_UNPROTECTED_PATHS: &str = "/favicon.ico,/docs,/openapi.json,/health";
pub const DEFAULT_UNLICENSED_PATHS: &str = "/license/v1/mine";

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    // audience the gateway expects in every token
    pub api_name: String,

    pub introspection_url: Url,
    pub client_id: String,
    pub client_secret: String,
    pub introspection_timeout: Duration,

    pub redis_url: String,
    pub cache_timeout: Duration,

    pub unprotected_paths: Vec<String>,
    pub unlicensed_paths: Vec<String>,
    pub admin_roles: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port: u16 = var("PORT").and_then(|s| s.parse().ok()).unwrap_or(8000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = required("DATABASE_URL")?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = split_list(&var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout = Duration::from_secs(
            var("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        let api_name = required("API_NAME")?;

        let introspection_url = match var("INTROSPECTION_URL") {
            Some(raw) => Url::parse(&raw).map_err(|_| ConfigError::Invalid("INTROSPECTION_URL"))?,
            None => keycloak_introspection_url(
                &required("KEYCLOAK_HOST")?,
                &required("KEYCLOAK_REALM")?,
            )?,
        };

        let client_id = required("KEYCLOAK_CLIENT_ID")?;
        let client_secret = required("KEYCLOAK_CLIENT_SECRET")?;

        let introspection_timeout = Duration::from_millis(
            var("INTROSPECTION_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3000),
        );

        let redis_url = match var("REDIS_URL") {
            Some(url) => url,
            None => redis_url_from_parts(
                &var("REDIS_HOST").unwrap_or_else(|| "localhost".to_string()),
                var("REDIS_PORT")
                    .map(|p| p.parse::<u16>().map_err(|_| ConfigError::Invalid("REDIS_PORT")))
                    .transpose()?
                    .unwrap_or(6379),
                var("REDIS_DB")
                    .map(|d| d.parse::<u32>().map_err(|_| ConfigError::Invalid("REDIS_DB")))
                    .transpose()?
                    .unwrap_or(0),
                var("REDIS_PASSWORD").filter(|p| !p.is_empty()).as_deref(),
            )?,
        };

        let cache_timeout = Duration::from_millis(
            var("CACHE_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1000),
        );

        let unprotected_paths = split_list(
            &var("UNPROTECTED_PATHS").unwrap_or_else(|| DEFAULT_UNPROTECTED_PATHS.to_string()),
        );
        let unlicensed_paths = split_list(
            &var("UNLICENSED_PATHS").unwrap_or_else(|| DEFAULT_UNLICENSED_PATHS.to_string()),
        );

        let admin_roles = split_list(&var("ADMIN_ROLES").unwrap_or_else(|| "admin".to_string()));

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout,
            api_name,
            introspection_url,
            client_id,
            client_secret,
            introspection_timeout,
            redis_url,
            cache_timeout,
            unprotected_paths,
            unlicensed_paths,
            admin_roles,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn keycloak_introspection_url(host: &str, realm: &str) -> Result<Url, ConfigError> {
    // KEYCLOAK_HOST may be given without a scheme (e.g. `sso.internal:8080`)
    let mut base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    // keep a context path such as `/auth` when joining
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base).map_err(|_| ConfigError::Invalid("KEYCLOAK_HOST"))?;

    base.join(&format!(
        "realms/{realm}/protocol/openid-connect/token/introspect"
    ))
    .map_err(|_| ConfigError::Invalid("KEYCLOAK_REALM"))
}

fn redis_url_from_parts(
    host: &str,
    port: u16,
    db: u32,
    password: Option<&str>,
) -> Result<String, ConfigError> {
    let mut url = Url::parse(&format!("redis://{host}:{port}/{db}"))
        .map_err(|_| ConfigError::Invalid("REDIS_HOST"))?;

    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| ConfigError::Invalid("REDIS_PASSWORD"))?;
    }

    Ok(url.to_string())
}
