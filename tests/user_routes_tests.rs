mod helpers;

use helpers::{create_fake_login_test_user, create_login_test_user};
use kindred_server::entities::user_auth::local_user_entity::UserProfileView;

test_with_server!(search_users_by_username, |server, ctx_state, config| {
    create_login_test_user(&server, "martina_k".to_string()).await;
    create_login_test_user(&server, "martin_b".to_string()).await;
    create_login_test_user(&server, "ophelia".to_string()).await;

    let response = server.get("/api/users/search?q=martin").await;
    response.assert_status_success();
    let found = response.json::<Vec<UserProfileView>>();
    assert_eq!(found.len(), 2);

    let response = server.get("/api/users/search?q=MARTINA").await;
    response.assert_status_success();
    let found = response.json::<Vec<UserProfileView>>();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "martina_k");

    let response = server.get("/api/users/search?q=nobody_here").await;
    let found = response.json::<Vec<UserProfileView>>();
    assert!(found.is_empty());
});

test_with_server!(get_user_profile_by_id, |server, ctx_state, config| {
    let user = create_fake_login_test_user(&server).await;

    let response = server.get(&format!("/api/users/{}", user.id)).await;
    response.assert_status_success();
    let profile = response.json::<UserProfileView>();
    assert_eq!(profile.username, user.username);

    let missing = server.get("/api/users/local_user:missing").await;
    missing.assert_status_not_found();
});
