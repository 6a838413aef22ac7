use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_view, with_not_found_err, IdentIdName, ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

/// Public Q&A submission addressed to a guru user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuruQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub guru: Thing,
    pub asked_by: Thing,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuruQuestionView {
    pub id: Thing,
    pub guru_username: String,
    pub asked_by_username: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ViewFieldSelector for GuruQuestionView {
    fn get_select_query_fields() -> String {
        "id, guru.username as guru_username, asked_by.username as asked_by_username, question, answer, answered_at, created_at"
            .to_string()
    }
}

pub struct GuruQuestionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "guru_question";
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> GuruQuestionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS guru ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE INDEX IF NOT EXISTS guru_idx ON TABLE {TABLE_NAME} COLUMNS guru;
    DEFINE FIELD IF NOT EXISTS asked_by ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS question ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS answer ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS answered_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate guru_question");

        Ok(())
    }

    pub async fn create(&self, record: GuruQuestion) -> CtxResult<GuruQuestion> {
        let res = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<GuruQuestion>| v.unwrap());
        res
    }

    pub async fn get(&self, ident_id_name: IdentIdName) -> CtxResult<GuruQuestion> {
        let opt =
            get_entity::<GuruQuestion>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn get_view(&self, ident_id_name: &IdentIdName) -> CtxResult<GuruQuestionView> {
        let opt = get_entity_view::<GuruQuestionView>(self.db, TABLE_NAME.to_string(), ident_id_name)
            .await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn list_by_guru_desc(&self, guru: Thing) -> CtxResult<Vec<GuruQuestionView>> {
        let qry = format!(
            "SELECT {} FROM {TABLE_NAME} WHERE guru=<record>$guru ORDER BY created_at DESC;",
            GuruQuestionView::get_select_query_fields()
        );
        let mut res = self.db.query(qry).bind(("guru", guru.to_raw())).await?;
        Ok(res.take::<Vec<GuruQuestionView>>(0)?)
    }

    pub async fn set_answer(&self, question_id: Thing, answer: String) -> CtxResult<GuruQuestion> {
        let q = "UPDATE $ident SET answer=$answer, answered_at=time::now();";
        let question: Option<GuruQuestion> = self
            .db
            .query(q)
            .bind(("ident", question_id.clone()))
            .bind(("answer", answer))
            .await?
            .take(0)?;
        question.ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: question_id.to_raw(),
        }))
    }
}
