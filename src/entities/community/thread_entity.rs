use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::community::community_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    exists_entity, get_entity, get_entity_list_view, get_entity_view, with_not_found_err,
    IdentIdName, Pagination, QryOrder, ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

/// A top-level post inside a community, owning a flat set of replies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Thread {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub belongs_to: Thing,
    pub created_by: Thing,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub replies_nr: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: Thing,
    pub belongs_to: Thing,
    pub username: String,
    pub title: String,
    pub content: String,
    pub replies_nr: i64,
    pub created_at: DateTime<Utc>,
}

impl ViewFieldSelector for ThreadView {
    fn get_select_query_fields() -> String {
        "id, belongs_to, created_by.username as username, title, content, replies_nr, created_at"
            .to_string()
    }
}

pub struct ThreadDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "thread";
const TABLE_COL_COMMUNITY: &str = community_entity::TABLE_NAME;
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> ThreadDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS belongs_to ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_COMMUNITY}>;
    DEFINE INDEX IF NOT EXISTS belongs_to_idx ON TABLE {TABLE_NAME} COLUMNS belongs_to;
    DEFINE FIELD IF NOT EXISTS created_by ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS replies_nr ON TABLE {TABLE_NAME} TYPE number DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate thread");

        Ok(())
    }

    pub async fn must_exist(&self, ident: IdentIdName) -> CtxResult<Thing> {
        let opt = exists_entity(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get(&self, ident_id_name: IdentIdName) -> CtxResult<Thread> {
        let opt = get_entity::<Thread>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: &IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn create(&self, record: Thread) -> CtxResult<Thread> {
        let res = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Thread>| v.unwrap());
        res
    }

    pub async fn get_by_community_desc_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        community_id: Thing,
        from: i32,
        count: i8,
    ) -> CtxResult<Vec<T>> {
        get_entity_list_view::<T>(
            self.db,
            TABLE_NAME.to_string(),
            &IdentIdName::ColumnIdent {
                column: "belongs_to".to_string(),
                val: community_id.to_raw(),
                rec: true,
            },
            Some(Pagination {
                order_by: Some("created_at".to_string()),
                order_dir: Some(QryOrder::DESC),
                count,
                start: from,
            }),
        )
        .await
    }

    pub async fn increase_replies_nr(&self, thread_id: Thing) -> CtxResult<Thread> {
        let q = "UPDATE $ident SET replies_nr += 1;";
        let thread: Option<Thread> = self
            .db
            .query(q)
            .bind(("ident", thread_id.clone()))
            .await?
            .take(0)?;
        thread.ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: thread_id.to_raw(),
        }))
    }

    pub async fn decrease_replies_nr(&self, thread_id: Thing) -> CtxResult<Thread> {
        let q = "UPDATE $ident SET replies_nr -= 1;";
        let thread: Option<Thread> = self
            .db
            .query(q)
            .bind(("ident", thread_id.clone()))
            .await?
            .take(0)?;
        thread.ok_or(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: thread_id.to_raw(),
        }))
    }
}
