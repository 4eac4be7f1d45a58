//! Gateway の 2 段 (token → licence) とロール制御
//!
//! 適用順は固定: token stage が外側、licence stage が内側。
//! どちらかが失敗したら handler は呼ばれず、エラーエンベロープを返す。
//!
//! 例：
//! ```ignore
//! let app = api::routes(state.clone());
//! let app = middleware::auth::apply(app, gateway);
//! ```

mod licence;
mod roles;
mod token;

use axum::{Router, middleware};

use crate::state::GatewayState;

pub use roles::require_roles;

/// axum の layer は後に付けたものが外側になるため、licence → token の順で重ねる
pub fn apply<S>(router: Router<S>, gateway: GatewayState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn_with_state(gateway.clone(), licence::licence_stage))
        .layer(middleware::from_fn_with_state(gateway, token::token_stage))
}
