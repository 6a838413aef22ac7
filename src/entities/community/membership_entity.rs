use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::community::community_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

/// Membership of a user in a community, carrying the optional
/// stage/kind sub-dimensions used for member discovery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommunityMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub community: Thing,
    pub user: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Member row joined with the user's public profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberProfileView {
    pub id: Thing,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_guru: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

pub struct CommunityMemberDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "community_member";
const TABLE_COL_COMMUNITY: &str = community_entity::TABLE_NAME;
const TABLE_COL_USER: &str = local_user_entity::TABLE_NAME;

impl<'a> CommunityMemberDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS community ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_COMMUNITY}>;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{TABLE_COL_USER}>;
    DEFINE FIELD IF NOT EXISTS stage ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS kind ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS joined_at ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS community_user_idx ON TABLE {TABLE_NAME} COLUMNS community, user UNIQUE;
    DEFINE INDEX IF NOT EXISTS community_idx ON TABLE {TABLE_NAME} COLUMNS community;
    DEFINE INDEX IF NOT EXISTS user_idx ON TABLE {TABLE_NAME} COLUMNS user;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate community_member");

        Ok(())
    }

    pub async fn join(&self, record: CommunityMember) -> CtxResult<CommunityMember> {
        let res = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))
            .map(|v: Option<CommunityMember>| v.unwrap());
        res
    }

    pub async fn leave(&self, community: Thing, user: Thing) -> CtxResult<()> {
        let res = self
            .db
            .query(format!(
                "DELETE FROM {TABLE_NAME} WHERE community=<record>$community AND user=<record>$user;"
            ))
            .bind(("community", community.to_raw()))
            .bind(("user", user.to_raw()))
            .await?;
        res.check()?;
        Ok(())
    }

    pub async fn get_membership(
        &self,
        community: Thing,
        user: Thing,
    ) -> CtxResult<Option<CommunityMember>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE community=<record>$community AND user=<record>$user;"
            ))
            .bind(("community", community.to_raw()))
            .bind(("user", user.to_raw()))
            .await?;
        Ok(res.take::<Option<CommunityMember>>(0)?)
    }

    pub async fn is_member(&self, community: Thing, user: Thing) -> CtxResult<bool> {
        Ok(self.get_membership(community, user).await?.is_some())
    }

    /// Member discovery by the community x stage x kind dimensions.
    pub async fn search_members(
        &self,
        community: Thing,
        stage: Option<String>,
        kind: Option<String>,
    ) -> CtxResult<Vec<MemberProfileView>> {
        let mut filters = vec!["community=<record>$community".to_string()];
        if stage.is_some() {
            filters.push("stage=$stage".to_string());
        }
        if kind.is_some() {
            filters.push("kind=$kind".to_string());
        }
        let qry = format!(
            "SELECT user.id as id, user.username as username, user.full_name as full_name, \
             user.bio as bio, user.is_guru as is_guru, stage, kind \
             FROM {TABLE_NAME} WHERE {} ORDER BY username ASC;",
            filters.join(" AND ")
        );
        let mut qry = self.db.query(qry).bind(("community", community.to_raw()));
        if let Some(stage) = stage {
            qry = qry.bind(("stage", stage));
        }
        if let Some(kind) = kind {
            qry = qry.bind(("kind", kind));
        }
        let mut res = qry.await?;
        Ok(res.take::<Vec<MemberProfileView>>(0)?)
    }
}
