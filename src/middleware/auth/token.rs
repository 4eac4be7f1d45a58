//! Token stage: bearer token → (cache | introspection) → gates → AuthCtx を extensions に入れる
//!
//! - Unprotected なパスは何も見ずに通す
//! - `Cache-Control: no-cache` 付きのリクエストは cache を捨てて introspection し直す

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::path_policy::PathClass;
use crate::services::token::{extract_bearer, fingerprint};
use crate::state::GatewayState;

pub(super) async fn token_stage(
    State(gw): State<GatewayState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if gw.paths.classify(req.uri().path()) == PathClass::Unprotected {
        return Ok(next.run(req).await);
    }

    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(err) => {
            tracing::warn!(path = %req.uri().path(), "bearer token missing or malformed");
            return Err(err.into());
        }
    };

    let verified = if wants_refresh(req.headers()) {
        tracing::debug!(token = %fingerprint(&token), "forced token refresh");
        gw.tokens.refresh(&token).await
    } else {
        gw.tokens.verify(&token).await
    };

    let ctx = match verified {
        Ok(ctx) => ctx,
        Err(err) => {
            let err = AppError::from(err);
            tracing::warn!(
                token = %fingerprint(&token),
                path = %req.uri().path(),
                code = err.code(),
                "token rejected"
            );
            return Err(err);
        }
    };

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// `Cache-Control` carries a `no-cache` directive.
fn wants_refresh(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
}
