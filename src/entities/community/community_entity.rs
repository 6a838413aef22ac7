use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Id, Thing};
use validator::Validate;

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    exists_entity, get_entity, get_entity_view, with_not_found_err, IdentIdName, ViewFieldSelector,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct Community {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub name_uri: String,
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    pub created_by: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub struct CommunityDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "community";
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

#[derive(Debug, Serialize, Deserialize)]
pub struct CommunityView {
    pub id: Thing,
    pub name_uri: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    pub created_by_username: String,
}

impl ViewFieldSelector for CommunityView {
    fn get_select_query_fields() -> String {
        "id, name_uri, title, about, created_by.username as created_by_username".to_string()
    }
}

impl<'a> CommunityDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS name_uri ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value) ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS about ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_by ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS community_name_uri_idx ON TABLE {TABLE_NAME} COLUMNS name_uri UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate community");

        Ok(())
    }

    pub async fn must_exist(&self, ident: IdentIdName) -> CtxResult<Thing> {
        let opt = exists_entity(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn get(&self, ident_id_name: IdentIdName) -> CtxResult<Community> {
        let opt = get_entity::<Community>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn list_view(&self, start: i32, count: i8) -> CtxResult<Vec<CommunityView>> {
        let count = if count <= 0 { 20 } else { count };
        let start = if start < 0 { 0 } else { start };
        let qry = format!(
            "SELECT {}, created_at FROM {TABLE_NAME} ORDER BY created_at DESC LIMIT BY type::int($count) START AT type::int($start);",
            CommunityView::get_select_query_fields()
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("count", count as i64))
            .bind(("start", start as i64))
            .await?;
        Ok(res.take::<Vec<CommunityView>>(0)?)
    }

    pub async fn create_update(&self, mut record: Community) -> CtxResult<Community> {
        let resource = record
            .id
            .clone()
            .unwrap_or(Thing::from((TABLE_NAME.to_string(), Id::ulid())));

        record.created_at = None;
        let comm: Option<Community> = self
            .db
            .upsert((resource.tb, resource.id.to_raw()))
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        Ok(comm.unwrap())
    }
}
