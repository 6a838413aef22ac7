use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_cookies::{Cookie, Cookies};

use crate::entities::user_auth::local_user_entity::LocalUser;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::CtxResult;
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::services::auth_service::{AuthLoginInput, AuthRegisterInput, AuthService};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", get(logout))
}

#[derive(Debug, Serialize)]
struct AuthSuccess {
    id: String,
    username: String,
    token: String,
}

async fn register(
    State(state): State<Arc<CtxState>>,
    cookies: Cookies,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<AuthRegisterInput>,
) -> CtxResult<Response> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let (token, user) = auth_service.register_password(input).await?;
    Ok(auth_response(cookies, token, user))
}

async fn login(
    State(state): State<Arc<CtxState>>,
    cookies: Cookies,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<AuthLoginInput>,
) -> CtxResult<Response> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let (token, user) = auth_service.login_password(input).await?;
    Ok(auth_response(cookies, token, user))
}

async fn logout(cookies: Cookies) -> Response {
    cookies.remove(Cookie::new(JWT_KEY, ""));
    StatusCode::OK.into_response()
}

fn auth_response(cookies: Cookies, token: String, user: LocalUser) -> Response {
    cookies.add(Cookie::new(JWT_KEY, token.clone()));
    (
        StatusCode::OK,
        Json(AuthSuccess {
            id: user.id.map(|v| v.to_raw()).unwrap_or_default(),
            username: user.username,
            token,
        }),
    )
        .into_response()
}
