use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::community::thread_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use crate::models::view::reply::ReplyView;
use middleware::utils::db_utils::{
    get_entity, get_entity_view, with_not_found_err, IdentIdName, ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

/// A reply to a thread. `parent_reply` points at another reply of the same
/// thread; absent means top-level. Deleting a reply does not cascade, so a
/// parent_reply may dangle - readers have to tolerate that.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub belongs_to: Thing,
    pub created_by: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_reply: Option<Thing>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct ReplyDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "reply";
const TABLE_COL_THREAD: &str = thread_entity::TABLE_NAME;
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> ReplyDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS belongs_to ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_THREAD}>;
    DEFINE INDEX IF NOT EXISTS belongs_to_idx ON TABLE {TABLE_NAME} COLUMNS belongs_to;
    DEFINE FIELD IF NOT EXISTS created_by ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS parent_reply ON TABLE {TABLE_NAME} TYPE option<record<{TABLE_NAME}>>;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate reply");

        Ok(())
    }

    pub async fn create(&self, record: Reply) -> CtxResult<Reply> {
        let res = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<Reply>| v.unwrap());
        res
    }

    pub async fn get(&self, ident_id_name: IdentIdName) -> CtxResult<Reply> {
        let opt = get_entity::<Reply>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: &IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    /// The complete reply list for one thread, ascending by creation time.
    /// This is the input shape the card builder expects.
    pub async fn list_by_thread_asc(&self, thread_id: Thing) -> CtxResult<Vec<ReplyView>> {
        let qry = format!(
            "SELECT {} FROM {TABLE_NAME} WHERE belongs_to=<record>$thread ORDER BY created_at ASC;",
            ReplyView::get_select_query_fields()
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("thread", thread_id.to_raw()))
            .await?;
        Ok(res.take::<Vec<ReplyView>>(0)?)
    }

    /// Removes one reply. Children are left in place with a dangling
    /// parent_reply - the card builder resolves them as orphan roots.
    pub async fn delete(&self, id: Thing) -> CtxResult<()> {
        let _ = self
            .db
            .delete::<Option<Reply>>((id.tb, id.id.to_raw()))
            .await
            .map_err(|e| AppError::SurrealDb {
                source: e.to_string(),
            })?;

        Ok(())
    }
}
