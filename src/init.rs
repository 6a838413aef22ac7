use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::database::client::Database;
use crate::entities::community::community_entity::CommunityDbService;
use crate::entities::community::membership_entity::CommunityMemberDbService;
use crate::entities::community::reply_entity::ReplyDbService;
use crate::entities::community::thread_entity::ThreadDbService;
use crate::entities::guru::guru_question_entity::GuruQuestionDbService;
use crate::entities::user_auth::authentication_entity::AuthenticationDbService;
use crate::entities::user_auth::local_user_entity::LocalUserDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::AppResult;
use crate::middleware::mw_ctx::CtxState;
use crate::routes::community::{community_routes, reply_routes, thread_routes};
use crate::routes::{auth_routes, guru_routes, user_routes};

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    let db = database.client.clone();
    let c = Ctx::new(Ok("migrations".to_string()), Uuid::new_v4());

    LocalUserDbService { db: &db, ctx: &c }.mutate_db().await?;
    AuthenticationDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    CommunityDbService { db: &db, ctx: &c }.mutate_db().await?;
    CommunityMemberDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    ThreadDbService { db: &db, ctx: &c }.mutate_db().await?;
    ReplyDbService { db: &db, ctx: &c }.mutate_db().await?;
    GuruQuestionDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .merge(auth_routes::routes())
        .merge(user_routes::routes())
        .merge(community_routes::routes())
        .merge(thread_routes::routes())
        .merge(reply_routes::routes())
        .merge(guru_routes::routes())
        .with_state(ctx_state.clone())
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
