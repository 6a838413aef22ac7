use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use community_entity::{Community, CommunityDbService, CommunityView};
use local_user_entity::LocalUserDbService;
use membership_entity::{CommunityMember, CommunityMemberDbService, MemberProfileView};

use crate::entities::community::{community_entity, membership_entity};
use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::IdentIdName;
use crate::middleware::utils::extractor_utils::{JsonOrFormValidated, ListParams};
use crate::middleware::utils::string_utils::get_string_thing;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/communities", post(create_community).get(list_communities))
        .route("/api/communities/:name", get(get_community))
        .route("/api/communities/:community_id/join", post(join_community))
        .route("/api/communities/:community_id/leave", post(leave_community))
        .route("/api/communities/:community_id/members", get(list_members))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct CommunityInput {
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub name_uri: String,
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub title: String,
    pub about: Option<String>,
}

#[derive(Deserialize, Serialize, Validate)]
pub struct JoinInput {
    pub stage: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MemberFilterParams {
    pub stage: Option<String>,
    pub kind: Option<String>,
}

async fn create_community(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<CommunityInput>,
) -> CtxResult<Json<Community>> {
    let created_by = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let comm_db_service = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let community = comm_db_service
        .create_update(Community {
            id: None,
            name_uri: input.name_uri,
            title: input.title,
            about: input.about,
            created_by: created_by.clone(),
            created_at: None,
        })
        .await?;

    let community_id = community.id.clone().ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Community created without id".to_string(),
    }))?;

    // the creator is a member from the start
    CommunityMemberDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .join(CommunityMember {
        id: None,
        community: community_id,
        user: created_by,
        stage: None,
        kind: None,
        joined_at: None,
    })
    .await?;

    Ok(Json(community))
}

async fn list_communities(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(params): Query<ListParams>,
) -> CtxResult<Json<Vec<CommunityView>>> {
    let communities = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_view(params.start.unwrap_or(0), params.count.unwrap_or(20))
    .await?;
    Ok(Json(communities))
}

async fn get_community(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(name): Path<String>,
) -> CtxResult<Json<CommunityView>> {
    let ident_id_name = match name.contains(":") {
        true => IdentIdName::Id(get_string_thing(name)?),
        false => IdentIdName::ColumnIdent {
            column: "name_uri".to_string(),
            val: name.to_lowercase(),
            rec: false,
        },
    };
    let comm_view = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_view::<CommunityView>(ident_id_name)
    .await?;
    Ok(Json(comm_view))
}

async fn join_community(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(community_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<JoinInput>,
) -> CtxResult<Json<CommunityMember>> {
    let user = LocalUserDbService {
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

    let member_db_service = CommunityMemberDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    if member_db_service
        .is_member(community.clone(), user.clone())
        .await?
    {
        return Err(ctx.to_ctx_error(AppError::Generic {
            description: "Already a member".to_string(),
        }));
    }

    let membership = member_db_service
        .join(CommunityMember {
            id: None,
            community,
            user,
            stage: input.stage,
            kind: input.kind,
            joined_at: None,
        })
        .await?;
    Ok(Json(membership))
}

async fn leave_community(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(community_id): Path<String>,
) -> CtxResult<Json<serde_json::Value>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let community = get_string_thing(community_id)?;
    CommunityMemberDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .leave(community, user)
    .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn list_members(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(community_id): Path<String>,
    Query(params): Query<MemberFilterParams>,
) -> CtxResult<Json<Vec<MemberProfileView>>> {
    let community = CommunityDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .must_exist(IdentIdName::Id(get_string_thing(community_id)?))
    .await?;

    let members = CommunityMemberDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .search_members(community, params.stage, params.kind)
    .await?;
    Ok(Json(members))
}
