use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use guru_question_entity::{GuruQuestion, GuruQuestionDbService, GuruQuestionView};
use local_user_entity::{LocalUserDbService, UserProfileView};

use crate::entities::guru::guru_question_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::IdentIdName;
use crate::middleware::utils::extractor_utils::JsonOrFormValidated;
use crate::middleware::utils::string_utils::get_string_thing;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/gurus", get(get_gurus))
        .route(
            "/api/gurus/:user_id/questions",
            get(get_guru_questions).post(ask_question),
        )
        .route("/api/guru-questions/:question_id/answer", post(answer_question))
}

#[derive(Deserialize, Serialize, Validate)]
pub struct QuestionInput {
    #[validate(length(min = 5, message = "Min 5 characters"))]
    pub question: String,
}

#[derive(Deserialize, Serialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1, message = "Min 1 character"))]
    pub answer: String,
}

async fn get_gurus(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<UserProfileView>>> {
    let gurus = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_gurus()
    .await?;
    Ok(Json(gurus))
}

async fn ask_question(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<QuestionInput>,
) -> CtxResult<Json<GuruQuestionView>> {
    let user_db_service = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let asked_by = user_db_service.get_ctx_user_thing().await?;

    let guru = user_db_service
        .get(IdentIdName::Id(get_string_thing(user_id)?))
        .await?;
    if !guru.is_guru {
        return Err(ctx.to_ctx_error(AppError::Generic {
            description: "User is not a guru".to_string(),
        }));
    }
    let guru_id = guru.id.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Guru without id".to_string(),
    }))?;

    let question_db_service = GuruQuestionDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let question = question_db_service
        .create(GuruQuestion {
            id: None,
            guru: guru_id,
            asked_by,
            question: input.question,
            answer: None,
            answered_at: None,
            created_at: None,
        })
        .await?;

    let question_id = question.id.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Question created without id".to_string(),
    }))?;
    let view = question_db_service
        .get_view(&IdentIdName::Id(question_id))
        .await?;
    Ok(Json(view))
}

async fn get_guru_questions(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<Json<Vec<GuruQuestionView>>> {
    let questions = GuruQuestionDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .list_by_guru_desc(get_string_thing(user_id)?)
    .await?;
    Ok(Json(questions))
}

async fn answer_question(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(question_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<AnswerInput>,
) -> CtxResult<Json<GuruQuestionView>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?;

    let question_db_service = GuruQuestionDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let question_thing = get_string_thing(question_id)?;
    let question = question_db_service
        .get(IdentIdName::Id(question_thing.clone()))
        .await?;

    if question.guru != user {
        return Err(ctx.to_ctx_error(AppError::AuthorizationFail {
            required: "addressed guru".to_string(),
        }));
    }

    question_db_service
        .set_answer(question_thing.clone(), input.answer)
        .await?;
    let view = question_db_service
        .get_view(&IdentIdName::Id(question_thing))
        .await?;
    Ok(Json(view))
}
