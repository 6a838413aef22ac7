use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult, CtxError, CtxResult};
use crate::middleware::mw_ctx::{CtxState, JWT_KEY};
use crate::utils::jwt::TokenType;

/// Per-request context. Carries the authenticated user id (or the auth
/// failure that will surface once a handler actually asks for it) and a
/// request id for error reporting.
#[derive(Clone, Debug)]
pub struct Ctx {
    result_user_id: AppResult<String>,
    req_id: Uuid,
}

impl Ctx {
    pub fn new(result_user_id: AppResult<String>, req_id: Uuid) -> Self {
        Self {
            result_user_id,
            req_id,
        }
    }

    pub fn user_id(&self) -> CtxResult<String> {
        self.result_user_id.clone().map_err(|error| CtxError {
            error,
            req_id: self.req_id,
        })
    }

    pub fn req_id(&self) -> Uuid {
        self.req_id
    }

    pub fn to_ctx_error(&self, error: AppError) -> CtxError {
        CtxError {
            req_id: self.req_id,
            error,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<CtxState>> for Ctx {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<CtxState>,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state): State<Arc<CtxState>> = State::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        // Bearer token wins over the login cookie so API clients can act as
        // someone other than the browser session.
        let token = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(bearer) => Some(bearer.token().to_string()),
            None => {
                let cookies = CookieJar::from_request_parts(parts, state)
                    .await
                    .map_err(|_| StatusCode::BAD_REQUEST)?;
                cookies.get(JWT_KEY).map(|c| c.value().to_string())
            }
        };

        let jwt_user_id: AppResult<String> = match token {
            Some(token) => match app_state.jwt.decode_by_type(&token, TokenType::Login) {
                Ok(claims) => Ok(claims.auth),
                Err(_) => Err(AppError::AuthFailNoJwtCookie),
            },
            None => Err(AppError::AuthFailNoJwtCookie),
        };

        Ok(Ctx::new(jwt_user_id, Uuid::new_v4()))
    }
}
