//! Licence stage: `X-License-Key` → 呼び出し元の licence 集合 → 有効期間で絞り込み → 照合
//!
//! - token stage の内側で動く前提 (AuthCtx が extensions にあること)
//! - Unprotected / Unlicensed なパスは素通し
//! - licence 集合は上流が付けた ContextLicences を優先し、無ければ LicenceSource から取って付ける

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::licence::{ContextLicences, LicenceError, verifier::check_licence_header};
use crate::services::path_policy::PathClass;
use crate::state::GatewayState;

pub(super) async fn licence_stage(
    State(gw): State<GatewayState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if gw.paths.classify(req.uri().path()) != PathClass::Protected {
        return Ok(next.run(req).await);
    }

    let mut ctx = req
        .extensions()
        .get::<AuthCtx>()
        .cloned()
        .ok_or(AppError::MissingOrInvalidToken)?;

    let key = match check_licence_header(req.headers()) {
        Ok(key) => key.to_owned(),
        Err(err) => {
            tracing::warn!(user = %ctx.user_uuid, path = %req.uri().path(), "license key header missing");
            return Err(err.into());
        }
    };

    let attached = req.extensions().get::<ContextLicences>().cloned();
    let licences = match attached {
        Some(attached) => attached,
        None => {
            let fetched = gw
                .licences
                .caller_licences(&ctx.user_uuid)
                .await
                .map(ContextLicences)
                .inspect_err(|err| {
                    tracing::error!(user = %ctx.user_uuid, error = %err, "license retrieval failed");
                })?;
            req.extensions_mut().insert(fetched.clone());
            fetched
        }
    };

    let matched = gw
        .licences
        .match_licence(&licences.0, &key)
        .inspect_err(|err| {
            if matches!(err, LicenceError::NotFound) {
                tracing::warn!(user = %ctx.user_uuid, license = %key, "license not found among current licences");
            }
        })?;

    tracing::debug!(user = %ctx.user_uuid, license = %matched.uuid, "license matched");
    ctx.matched_license = Some(matched);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
