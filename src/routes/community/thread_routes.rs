use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use community_entity::CommunityDbService;
use local_user_entity::LocalUserDbService;
use thread_entity::{Thread, ThreadDbService, ThreadView};

use crate::entities::community::{community_entity, thread_entity};
use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::IdentIdName;
use crate::middleware::utils::extractor_utils::{JsonOrFormValidated, ListParams};
use crate::middleware::utils::string_utils::get_string_thing;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/communities/:community_id/threads",
            get(list_threads).post(create_thread),
        )
        .route("/api/threads/:thread_id", get(get_thread))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct ThreadInput {
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub content: String,
}

async fn create_thread(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(community_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ThreadInput>,
) -> CtxResult<Json<ThreadView>> {
    let created_by = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let community = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .must_exist(IdentIdName::Id(get_string_thing(community_id)?))
    .await?;

    let thread_db_service = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let thread = thread_db_service
        .create(Thread {
            id: None,
            belongs_to: community,
            created_by,
            title: input.title,
            content: input.content,
            replies_nr: 0,
            created_at: None,
        })
        .await?;

    let thread_id = thread.id.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Thread created without id".to_string(),
    }))?;
    let view = thread_db_service
        .get_view::<ThreadView>(&IdentIdName::Id(thread_id))
        .await?;
    Ok(Json(view))
}

async fn list_threads(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(community_id): Path<String>,
    Query(params): Query<ListParams>,
) -> CtxResult<Json<Vec<ThreadView>>> {
    let community = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .must_exist(IdentIdName::Id(get_string_thing(community_id)?))
    .await?;

    let threads = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_by_community_desc_view::<ThreadView>(
        community,
        params.start.unwrap_or(0),
        params.count.unwrap_or(20),
    )
    .await?;
    Ok(Json(threads))
}

async fn get_thread(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(thread_id): Path<String>,
) -> CtxResult<Json<ThreadView>> {
    let view = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_view::<ThreadView>(&IdentIdName::Id(get_string_thing(thread_id)?))
    .await?;
    Ok(Json(view))
}
