/*
 * Responsibility
 * - /license/v1 系 handler (読み取り専用)
 * - entity 単位の一覧は、照合済み licence の entity_uuid をスコープにする
 * - /mine は licence stage を通らない (token だけで本人の有効 licence を返す)
 */
use axum::extract::{Path, Query, State};

use crate::{
    api::v1::{
        dto::{
            SuccessResponse,
            licences::{LicenceResponse, PurchaseQuery, validate_licence_key},
        },
        extractors::{AuthCtx, AuthCtxExtractor},
    },
    error::AppError,
    repos::licence_repo,
    services::licence::{License, LicenceView},
    state::AppState,
};

type Listing = SuccessResponse<Vec<LicenceResponse>>;

/// Entity of the licence this request was admitted with.
fn caller_entity(ctx: &AuthCtx) -> Result<&str, AppError> {
    ctx.matched_license
        .as_ref()
        .map(|l| l.entity_uuid.as_str())
        .ok_or(AppError::LicenceNotFound)
}

fn listing(rows: Vec<crate::services::licence::LicenceRecord>) -> Listing {
    SuccessResponse::new(rows.into_iter().map(LicenceResponse::from).collect())
}

pub async fn list_mine(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<SuccessResponse<Vec<License>>, AppError> {
    let now = state.clock.now_epoch();
    let rows = licence_repo::list_current_for_user(&state.db, &ctx.user_uuid, now).await?;

    Ok(SuccessResponse::new(rows.iter().map(|r| r.project()).collect()))
}

pub async fn list_purchased(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(query): Query<PurchaseQuery>,
) -> Result<Listing, AppError> {
    let entity = caller_entity(&ctx)?;
    let rows = licence_repo::list_by_name(&state.db, entity, query.name()).await?;

    Ok(listing(rows))
}

async fn list_view(state: &AppState, ctx: &AuthCtx, view: LicenceView) -> Result<Listing, AppError> {
    let entity = caller_entity(ctx)?;
    let now = state.clock.now_epoch();
    let rows = licence_repo::list_view(&state.db, entity, view, now).await?;

    tracing::debug!(entity = %entity, view = ?view, count = rows.len(), "license view listed");
    Ok(listing(rows))
}

pub async fn list_unassigned(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Listing, AppError> {
    list_view(&state, &ctx, LicenceView::Unassigned).await
}

pub async fn list_assigned(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Listing, AppError> {
    list_view(&state, &ctx, LicenceView::Assigned).await
}

pub async fn list_expired(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Listing, AppError> {
    list_view(&state, &ctx, LicenceView::Expired).await
}

pub async fn list_pending(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Listing, AppError> {
    list_view(&state, &ctx, LicenceView::Pending).await
}

pub async fn get_licence(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(licence_uuid): Path<String>,
) -> Result<SuccessResponse<LicenceResponse>, AppError> {
    validate_licence_key(&licence_uuid).map_err(AppError::bad_request)?;
    let entity = caller_entity(&ctx)?;

    // other entities' licences are indistinguishable from missing ones
    let row = licence_repo::get(&state.db, &licence_uuid)
        .await?
        .filter(|r| r.entity_uuid == entity)
        .ok_or(AppError::not_found("license"))?;

    Ok(SuccessResponse::new(row.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_comes_from_matched_licence() {
        let mut ctx = AuthCtx::default();
        assert!(matches!(caller_entity(&ctx), Err(AppError::LicenceNotFound)));

        ctx.matched_license = Some(License {
            uuid: "license-1".into(),
            type_uuid: "type-1".into(),
            name: "Pro".into(),
            iat: 0,
            exp: 10,
            entity_uuid: "entity-9".into(),
            api_roles: vec![],
            app_roles: vec![],
            apps: vec![],
        });
        assert_eq!(caller_entity(&ctx).unwrap(), "entity-9");
    }
}
