use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    database::client::Db,
    entities::user_auth::{
        authentication_entity::{AuthType, AuthenticationDbService, CreateAuthInput},
        local_user_entity::{LocalUser, LocalUserDbService},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        utils::db_utils::{IdentIdName, UsernameIdent},
        utils::string_utils::get_string_thing,
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::JWT,
    },
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthRegisterInput {
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub image_uri: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthLoginInput {
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
}

pub struct AuthService<'a> {
    ctx: &'a Ctx,
    jwt: &'a JWT,
    user_repository: LocalUserDbService<'a>,
    auth_repository: AuthenticationDbService<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx, jwt: &'a JWT) -> AuthService<'a> {
        AuthService {
            ctx,
            jwt,
            user_repository: LocalUserDbService { db, ctx },
            auth_repository: AuthenticationDbService { db, ctx },
        }
    }

    pub async fn login_password(&self, input: AuthLoginInput) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        let user = self
            .user_repository
            .get(UsernameIdent(input.username.to_lowercase()).into())
            .await?;

        let auth = self
            .auth_repository
            .get_by_auth_type(user.id.clone().unwrap(), AuthType::PASSWORD)
            .await?
            .ok_or(AppError::Generic {
                description: "Password not found".to_string(),
            })?;

        if !verify_password(&auth.token, &input.password) {
            return Err(self.ctx.to_ctx_error(AppError::AuthenticationFail));
        }

        let token = self.build_jwt_token(&user.id.as_ref().unwrap().to_raw())?;
        Ok((token, user))
    }

    pub async fn register_password(
        &self,
        input: AuthRegisterInput,
    ) -> CtxResult<(String, LocalUser)> {
        input.validate()?;

        if self.is_exists_by_username(input.username.clone()).await {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "The username is already used".to_string(),
            }));
        };

        let user = LocalUser {
            id: None,
            username: input.username.to_lowercase(),
            full_name: input.full_name,
            bio: input.bio,
            image_uri: input.image_uri,
            is_guru: false,
        };
        let hash = hash_password(&input.password)
            .map_err(|_| self.ctx.to_ctx_error(AppError::RegisterFail))?;

        let user_id = self.user_repository.create(user).await?;
        let user_thing = get_string_thing(user_id.clone())?;
        let user = self.user_repository.get(IdentIdName::Id(user_thing)).await?;

        self.auth_repository
            .create(CreateAuthInput {
                local_user: user.id.clone().unwrap(),
                token: hash,
                auth_type: AuthType::PASSWORD,
            })
            .await?;

        let token = self.build_jwt_token(&user_id)?;
        Ok((token, user))
    }

    async fn is_exists_by_username(&self, username: String) -> bool {
        self.user_repository
            .exists(UsernameIdent(username.to_lowercase()).into())
            .await
            .map(|v| v.is_some())
            .unwrap_or(false)
    }

    fn build_jwt_token(&self, user_id: &str) -> CtxResult<String> {
        self.jwt
            .create_by_login(user_id)
            .map_err(|_| self.ctx.to_ctx_error(AppError::AuthenticationFail))
    }
}
