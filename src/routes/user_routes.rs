use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use local_user_entity::{LocalUserDbService, UserProfileView};

use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::IdentIdName;
use crate::middleware::utils::string_utils::get_string_thing;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/users/search", get(search_users))
        .route("/api/users/:user_id", get(get_user))
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

async fn search_users(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(params): Query<SearchParams>,
) -> CtxResult<Json<Vec<UserProfileView>>> {
    let users = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .search(params.q)
    .await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<Json<UserProfileView>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_view::<UserProfileView>(IdentIdName::Id(get_string_thing(user_id)?))
    .await?;
    Ok(Json(user))
}
