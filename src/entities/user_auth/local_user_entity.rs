use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware;
use middleware::error::AppError::EntityFailIdNotFound;
use middleware::utils::db_utils::{
    exists_entity, get_entity, get_entity_view, with_not_found_err, IdentIdName, RecordWithId,
    ViewFieldSelector,
};
use middleware::utils::string_utils::get_string_thing;
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct LocalUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub is_guru: bool,
}

/// Public profile shape returned by discovery and guru endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileView {
    pub id: Thing,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub is_guru: bool,
}

impl ViewFieldSelector for UserProfileView {
    fn get_select_query_fields() -> String {
        "id, username, full_name, bio, image_uri, is_guru".to_string()
    }
}

pub struct LocalUserDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "local_user";

impl<'a> LocalUserDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS username ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value);
    DEFINE FIELD IF NOT EXISTS full_name ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS bio ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS image_uri ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS is_guru ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE INDEX IF NOT EXISTS local_user_username_idx ON TABLE {TABLE_NAME} COLUMNS username UNIQUE;
    DEFINE INDEX IF NOT EXISTS local_user_is_guru_idx ON TABLE {TABLE_NAME} COLUMNS is_guru;
");
        let local_user_mutation = self.db.query(sql).await?;

        local_user_mutation
            .check()
            .expect("should mutate local_user");

        Ok(())
    }

    pub async fn get_ctx_user_thing(&self) -> CtxResult<Thing> {
        let created_by = self.ctx.user_id()?;
        let user_id = get_string_thing(created_by.clone())?;
        let existing_id = self.exists(IdentIdName::Id(user_id.clone())).await?;
        match existing_id {
            None => Err(self
                .ctx
                .to_ctx_error(EntityFailIdNotFound { ident: created_by })),
            Some(_uid) => Ok(user_id),
        }
    }

    pub async fn exists(&self, ident: IdentIdName) -> CtxResult<Option<String>> {
        exists_entity(self.db, TABLE_NAME.to_string(), &ident)
            .await
            .map(|r| r.map(|o| o.to_raw()))
    }

    pub async fn get(&self, ident: IdentIdName) -> CtxResult<LocalUser> {
        let opt = get_entity::<LocalUser>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn search(&self, find: String) -> CtxResult<Vec<UserProfileView>> {
        let qry = format!(
            "SELECT {} FROM {TABLE_NAME} WHERE username CONTAINS $find OR full_name CONTAINS $find;",
            UserProfileView::get_select_query_fields()
        );
        let res = self.db.query(qry).bind(("find", find.to_lowercase()));
        let res: Vec<UserProfileView> = res.await?.take(0)?;
        Ok(res)
    }

    pub async fn get_gurus(&self) -> CtxResult<Vec<UserProfileView>> {
        let qry = format!(
            "SELECT {} FROM {TABLE_NAME} WHERE is_guru = true ORDER BY username ASC;",
            UserProfileView::get_select_query_fields()
        );
        let res: Vec<UserProfileView> = self.db.query(qry).await?.take(0)?;
        Ok(res)
    }

    pub async fn set_guru(&self, user_id: Thing, is_guru: bool) -> CtxResult<()> {
        let res = self
            .db
            .query("UPDATE $user_id SET is_guru=$is_guru;")
            .bind(("user_id", user_id))
            .bind(("is_guru", is_guru))
            .await?;
        res.check()?;
        Ok(())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn create(&self, ct_input: LocalUser) -> CtxResult<String> {
        let local_user_id: String = self
            .db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id.id.to_raw())
            .map(|id| format!("{TABLE_NAME}:{id}"))
            .map_err(CtxError::from(self.ctx))?;
        Ok(local_user_id)
    }

    pub async fn users_len(&self) -> CtxResult<i32> {
        let q = format!("SELECT count() FROM {TABLE_NAME} GROUP ALL;");
        let res: Option<i32> = self.db.query(q).await?.take("count")?;
        Ok(res.unwrap_or(0))
    }
}
