use rand::seq::SliceRandom;
use surrealdb::sql::Thing;
use uuid::Uuid;

use crate::entities::community::community_entity::{Community, CommunityDbService};
use crate::entities::community::membership_entity::{CommunityMember, CommunityMemberDbService};
use crate::entities::community::reply_entity::{Reply, ReplyDbService};
use crate::entities::community::thread_entity::{Thread, ThreadDbService};
use crate::entities::user_auth::local_user_entity::LocalUserDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::services::auth_service::{AuthRegisterInput, AuthService};

const DEMO_PASSWORD: &str = "demo-pass-123";
const STAGES: [&str; 3] = ["seeker", "practitioner", "mentor"];
const KINDS: [&str; 2] = ["local", "remote"];

/// Development-only demo content so a fresh instance has something to show.
pub async fn seed_demo_data(ctx_state: &CtxState) -> CtxResult<()> {
    let c = Ctx::new(Ok("seed_demo_data".to_string()), Uuid::new_v4());
    let db = &ctx_state.db.client;

    let user_db_service = LocalUserDbService { db, ctx: &c };
    if user_db_service.users_len().await? > 0 {
        return Ok(());
    }

    let auth_service = AuthService::new(db, &c, &ctx_state.jwt);
    let mut users: Vec<Thing> = vec![];
    for username in ["sage_amara", "river", "tomas", "petra"] {
        let (_, user) = auth_service
            .register_password(AuthRegisterInput {
                username: username.to_string(),
                password: DEMO_PASSWORD.to_string(),
                full_name: None,
                bio: None,
                image_uri: None,
            })
            .await?;
        users.push(user.id.ok_or(c.to_ctx_error(AppError::Generic {
            description: "Seed user without id".to_string(),
        }))?);
    }
    user_db_service.set_guru(users[0].clone(), true).await?;

    let community = CommunityDbService { db, ctx: &c }
        .create_update(Community {
            id: None,
            name_uri: "stillwater".to_string(),
            title: "Stillwater Circle".to_string(),
            about: Some("A quiet corner for daily practice notes.".to_string()),
            created_by: users[0].clone(),
            created_at: None,
        })
        .await?;
    let community_id = community.id.ok_or(c.to_ctx_error(AppError::Generic {
        description: "Seed community without id".to_string(),
    }))?;

    let member_db_service = CommunityMemberDbService { db, ctx: &c };
    let mut rng = rand::thread_rng();
    for user in users.iter() {
        member_db_service
            .join(CommunityMember {
                id: None,
                community: community_id.clone(),
                user: user.clone(),
                stage: STAGES.choose(&mut rng).map(|s| s.to_string()),
                kind: KINDS.choose(&mut rng).map(|s| s.to_string()),
                joined_at: None,
            })
            .await?;
    }

    let thread_db_service = ThreadDbService { db, ctx: &c };
    let thread = thread_db_service
        .create(Thread {
            id: None,
            belongs_to: community_id,
            created_by: users[1].clone(),
            title: "How do you keep a morning routine?".to_string(),
            content: "Mine keeps falling apart after a week or two.".to_string(),
            replies_nr: 0,
            created_at: None,
        })
        .await?;
    let thread_id = thread.id.ok_or(c.to_ctx_error(AppError::Generic {
        description: "Seed thread without id".to_string(),
    }))?;

    // a small nested conversation so the card view has something to stack
    let reply_db_service = ReplyDbService { db, ctx: &c };
    let first = reply_db_service
        .create(Reply {
            id: None,
            belongs_to: thread_id.clone(),
            created_by: users[0].clone(),
            parent_reply: None,
            content: "Start smaller than feels useful.".to_string(),
            created_at: None,
        })
        .await?;
    let follow_up = reply_db_service
        .create(Reply {
            id: None,
            belongs_to: thread_id.clone(),
            created_by: users[2].clone(),
            parent_reply: first.id.clone(),
            content: "Smaller how? Five minutes?".to_string(),
            created_at: None,
        })
        .await?;
    reply_db_service
        .create(Reply {
            id: None,
            belongs_to: thread_id.clone(),
            created_by: users[0].clone(),
            parent_reply: follow_up.id.clone(),
            content: "Two. You can always stay longer.".to_string(),
            created_at: None,
        })
        .await?;
    reply_db_service
        .create(Reply {
            id: None,
            belongs_to: thread_id.clone(),
            created_by: users[3].clone(),
            parent_reply: None,
            content: "Anchoring it to coffee worked for me.".to_string(),
            created_at: None,
        })
        .await?;
    for _ in 0..4 {
        thread_db_service.increase_replies_nr(thread_id.clone()).await?;
    }

    Ok(())
}
