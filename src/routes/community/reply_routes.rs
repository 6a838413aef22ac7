use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use local_user_entity::LocalUserDbService;
use reply_entity::{Reply, ReplyDbService};
use thread_entity::ThreadDbService;

use crate::entities::community::{reply_entity, thread_entity};
use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::IdentIdName;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::middleware::utils::string_utils::get_string_thing;
use crate::models::view::reply::ReplyView;
use crate::services::reply_cards::{build_cards, ReplyCard};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/threads/:thread_id/replies",
            get(get_thread_replies).post(create_reply),
        )
        .route("/api/threads/:thread_id/reply-cards", get(get_reply_cards))
        .route("/api/replies/:reply_id", delete(delete_reply))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct ReplyInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub content: String,
    pub parent_reply_id: Option<String>,
}

async fn create_reply(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(thread_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ReplyInput>,
) -> CtxResult<Json<ReplyView>> {
    let created_by = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let thread_db_service = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let thread_id = thread_db_service
        .must_exist(IdentIdName::Id(get_string_thing(thread_id)?))
        .await?;

    let reply_db_service = ReplyDbService {
        db: &state.db.client,
        ctx: &ctx,
    };

    // a parent must be an existing reply of the same thread
    let parent_reply = match input.parent_reply_id {
        None => None,
        Some(parent_id) => {
            let parent = reply_db_service
                .get(IdentIdName::Id(get_string_thing(parent_id)?))
                .await?;
            if parent.belongs_to != thread_id {
                return Err(ctx.to_ctx_error(AppError::Generic {
                    description: "Parent reply belongs to another thread".to_string(),
                }));
            }
            parent.id
        }
    };

    let reply = reply_db_service
        .create(Reply {
            id: None,
            belongs_to: thread_id.clone(),
            created_by,
            parent_reply,
            content: input.content,
            created_at: None,
        })
        .await?;

    let reply_id = reply.id.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Reply created without id".to_string(),
    }))?;
    let view = reply_db_service
        .get_view::<ReplyView>(&IdentIdName::Id(reply_id))
        .await?;

    thread_db_service.increase_replies_nr(thread_id).await?;

    Ok(Json(view))
}

async fn get_thread_replies(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(thread_id): Path<String>,
) -> CtxResult<Json<Vec<ReplyView>>> {
    let thread_id = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .must_exist(IdentIdName::Id(get_string_thing(thread_id)?))
    .await?;

    let replies = ReplyDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_by_thread_asc(thread_id)
    .await?;
    Ok(Json(replies))
}

/// The stacked conversation view: the flat reply list grouped into cards,
/// one per top-level reply, descendants flattened chronologically.
async fn get_reply_cards(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(thread_id): Path<String>,
) -> CtxResult<Json<Vec<ReplyCard>>> {
    let thread_id = ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .must_exist(IdentIdName::Id(get_string_thing(thread_id)?))
    .await?;

    let replies = ReplyDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_by_thread_asc(thread_id)
    .await?;
    Ok(Json(build_cards(replies)))
}

async fn delete_reply(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reply_id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let reply_thing = get_string_thing(reply_id)?;
    let reply_db_service = ReplyDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let reply = reply_db_service
        .get(IdentIdName::Id(reply_thing.clone()))
        .await?;

    if reply.created_by != user {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "reply author".to_string(),
        }));
    }

    // no cascade - children keep their dangling parent_reply
    reply_db_service.delete(reply_thing).await?;
    ThreadDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .decrease_replies_nr(reply.belongs_to)
    .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
