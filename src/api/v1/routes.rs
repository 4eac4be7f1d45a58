/*
 * Responsibility
 * - /license/v1 の URL 構造を定義
 * - entity 管理系 (purchase / 各 view) には admin ロールを route_layer で掛ける
 * - token / licence stage は app.rs でルート全体に掛ける
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::licences::{
    get_licence, list_assigned, list_expired, list_mine, list_pending, list_purchased,
    list_unassigned,
};
use crate::middleware::auth::require_roles;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/purchase", get(list_purchased))
        .route("/unassigned", get(list_unassigned))
        .route("/assigned", get(list_assigned))
        .route("/expired", get(list_expired))
        .route("/pending", get(list_pending));
    let admin = require_roles(admin, state.admin_roles.clone());

    Router::new()
        .route("/mine", get(list_mine))
        .route("/license/{licence_uuid}", get(get_licence))
        .merge(admin)
}
