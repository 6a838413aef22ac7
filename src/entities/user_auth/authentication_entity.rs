use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxResult},
};

#[derive(Debug, Serialize)]
pub struct CreateAuthInput {
    pub local_user: Thing,
    pub token: String,
    pub auth_type: AuthType,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthType {
    PASSWORD,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Authentication {
    pub id: Thing,
    pub local_user: Thing,
    pub auth_type: AuthType,
    pub token: String,
    pub updated_at: DateTime<Utc>,
}

const TABLE_NAME: &str = "authentication";

pub struct AuthenticationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> AuthenticationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
            DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
            DEFINE FIELD IF NOT EXISTS local_user ON TABLE {TABLE_NAME} TYPE record<local_user>;
            DEFINE FIELD IF NOT EXISTS auth_type ON TABLE {TABLE_NAME} TYPE string;
            DEFINE FIELD IF NOT EXISTS token ON TABLE {TABLE_NAME} TYPE string;
            DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime VALUE time::now();

            DEFINE INDEX IF NOT EXISTS local_user_idx ON TABLE {TABLE_NAME} COLUMNS local_user;
            DEFINE INDEX IF NOT EXISTS auth_type_idx ON TABLE {TABLE_NAME} COLUMNS auth_type;
        ");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate authentication");

        Ok(())
    }

    pub async fn create(&self, input: CreateAuthInput) -> CtxResult<Authentication> {
        let create_auth: Option<Authentication> = self.db.create(TABLE_NAME).content(input).await?;
        Ok(create_auth.unwrap())
    }

    pub async fn get_by_auth_type(
        &self,
        user: Thing,
        auth: AuthType,
    ) -> CtxResult<Option<Authentication>> {
        let mut res = self
            .db
            .query("SELECT * FROM type::table($table) WHERE local_user=<record>$user AND auth_type=$auth_type;")
            .bind(("table", TABLE_NAME))
            .bind(("user", user.to_raw()))
            .bind(("auth_type", auth))
            .await?;

        Ok(res.take::<Option<Authentication>>(0)?)
    }
}
