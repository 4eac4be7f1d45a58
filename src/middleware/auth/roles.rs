//! Route 単位のロール制御。licence stage の内側で route_layer として掛ける
//!
//! 例：
//! ```ignore
//! let admin = Router::new().route("/unassigned", get(list_unassigned));
//! let admin = middleware::auth::require_roles(admin, state.admin_roles.clone());
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::permission::check_roles;

/// Granted roles are the matched licence's `api_roles`.
pub fn require_roles<S>(router: Router<S>, required: Arc<[String]>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(required, role_check))
}

async fn role_check(
    State(required): State<Arc<[String]>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<AuthCtx>()
        .ok_or(AppError::MissingOrInvalidToken)?;

    if let Err(err) = check_roles(ctx.api_roles(), &required) {
        tracing::warn!(user = %ctx.user_uuid, path = %req.uri().path(), "{err}");
        return Err(err.into());
    }

    Ok(next.run(req).await)
}
