mod helpers;

use helpers::{create_fake_login_test_user, create_login_test_user, AuthResponse};
use kindred_server::entities::user_auth::local_user_entity::LocalUserDbService;
use kindred_server::middleware::ctx::Ctx;
use kindred_server::middleware::utils::db_utils::UsernameIdent;
use uuid::Uuid;

test_with_server!(register_creates_user, |server, ctx_state, config| {
    let registered = create_login_test_user(&server, "usn1ame".to_string()).await;
    assert_eq!(registered.username, "usn1ame");
    assert!(registered.id.starts_with("local_user:"));
    assert!(!registered.token.is_empty());

    let db_service = LocalUserDbService {
        db: &ctx_state.db.client,
        ctx: &Ctx::new(Ok("user_ident".to_string()), Uuid::new_v4()),
    };
    let user = db_service
        .get(UsernameIdent("usn1ame".to_string()).into())
        .await
        .unwrap();
    assert_eq!(user.username, "usn1ame");
    assert!(!user.is_guru);
});

test_with_server!(register_rejects_taken_username, |server,
                                                   ctx_state,
                                                   config| {
    create_login_test_user(&server, "usn1ame".to_string()).await;

    let response = server
        .post("/api/register")
        .json(&serde_json::json!({
            "username": "usn1ame",
            "password": "another-pass1",
        }))
        .await;
    response.assert_status_failure();
});

test_with_server!(register_rejects_short_password, |server,
                                                    ctx_state,
                                                    config| {
    let response = server
        .post("/api/register")
        .json(&serde_json::json!({
            "username": "usn1ame",
            "password": "ab1",
        }))
        .await;
    response.assert_status_failure();
});

test_with_server!(login_returns_token, |server, ctx_state, config| {
    let registered = create_fake_login_test_user(&server).await;

    let response = server
        .post("/api/login")
        .json(&serde_json::json!({
            "username": registered.username,
            "password": "some3242paSs#$",
        }))
        .await;
    response.assert_status_success();
    let logged_in = response.json::<AuthResponse>();
    assert_eq!(logged_in.id, registered.id);
    assert!(!logged_in.token.is_empty());
});

test_with_server!(login_rejects_wrong_password, |server, ctx_state, config| {
    let registered = create_fake_login_test_user(&server).await;

    let response = server
        .post("/api/login")
        .json(&serde_json::json!({
            "username": registered.username,
            "password": "not-the-password1",
        }))
        .await;
    response.assert_status_failure();
});

test_with_server!(bearer_token_authenticates, |server, ctx_state, config| {
    let registered = create_fake_login_test_user(&server).await;

    // drop the cookie jar auth so only the header remains
    server.get("/api/logout").await.assert_status_success();

    let response = server
        .post("/api/communities")
        .add_header(
            "Authorization",
            format!("Bearer {}", registered.token),
        )
        .json(&serde_json::json!({
            "name_uri": "bearer_comm",
            "title": "Bearer community",
        }))
        .await;
    response.assert_status_success();
});

test_with_server!(protected_route_requires_auth, |server, ctx_state, config| {
    let response = server
        .post("/api/communities")
        .json(&serde_json::json!({
            "name_uri": "nope",
            "title": "Nope",
        }))
        .await;
    response.assert_status_failure();
});
