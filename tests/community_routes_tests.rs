mod helpers;

use helpers::create_fake_login_test_user;
use kindred_server::entities::community::community_entity::{Community, CommunityView};
use kindred_server::entities::community::membership_entity::MemberProfileView;

test_with_server!(create_and_get_community, |server, ctx_state, config| {
    let user = create_fake_login_test_user(&server).await;

    let create_response = server
        .post("/api/communities")
        .json(&serde_json::json!({
            "name_uri": "quiet_hours",
            "title": "Quiet Hours",
            "about": "Silence appreciation society",
        }))
        .await;
    create_response.assert_status_success();
    let community = create_response.json::<Community>();
    assert_eq!(community.name_uri, "quiet_hours");

    // fetch by name_uri
    let by_name = server.get("/api/communities/quiet_hours").await;
    by_name.assert_status_success();
    let view = by_name.json::<CommunityView>();
    assert_eq!(view.title, "Quiet Hours");
    assert_eq!(view.created_by_username, user.username);

    // fetch by record id
    let id_raw = community.id.as_ref().unwrap().to_raw();
    let by_id = server.get(&format!("/api/communities/{id_raw}")).await;
    by_id.assert_status_success();
});

test_with_server!(community_name_uri_is_unique, |server, ctx_state, config| {
    create_fake_login_test_user(&server).await;

    let first = server
        .post("/api/communities")
        .json(&serde_json::json!({
            "name_uri": "taken_name",
            "title": "First",
        }))
        .await;
    first.assert_status_success();

    let second = server
        .post("/api/communities")
        .json(&serde_json::json!({
            "name_uri": "taken_name",
            "title": "Second",
        }))
        .await;
    second.assert_status_failure();
});

test_with_server!(list_communities_newest_first, |server, ctx_state, config| {
    create_fake_login_test_user(&server).await;

    for name in ["first_comm", "second_comm", "third_comm"] {
        let response = server
            .post("/api/communities")
            .json(&serde_json::json!({
                "name_uri": name,
                "title": format!("Community {name}"),
            }))
            .await;
        response.assert_status_success();
    }

    let list = server.get("/api/communities").await;
    list.assert_status_success();
    let communities = list.json::<Vec<CommunityView>>();
    assert_eq!(communities.len(), 3);
    assert_eq!(communities[0].name_uri, "third_comm");
    assert_eq!(communities[2].name_uri, "first_comm");

    let page = server.get("/api/communities?start=1&count=1").await;
    page.assert_status_success();
    let paged = page.json::<Vec<CommunityView>>();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].name_uri, "second_comm");
});

test_with_server!(join_leave_and_member_filters, |server, ctx_state, config| {
    let creator = create_fake_login_test_user(&server).await;

    let community = server
        .post("/api/communities")
        .json(&serde_json::json!({
            "name_uri": "walkers",
            "title": "Walkers",
        }))
        .await
        .json::<Community>();
    let community_id = community.id.as_ref().unwrap().to_raw();

    // second user joins with profile attributes
    let joiner = create_fake_login_test_user(&server).await;
    let join = server
        .post(&format!("/api/communities/{community_id}/join"))
        .json(&serde_json::json!({
            "stage": "practitioner",
            "kind": "remote",
        }))
        .await;
    join.assert_status_success();

    // double join is rejected
    let again = server
        .post(&format!("/api/communities/{community_id}/join"))
        .json(&serde_json::json!({}))
        .await;
    again.assert_status_failure();

    let members = server
        .get(&format!("/api/communities/{community_id}/members"))
        .await;
    members.assert_status_success();
    let all = members.json::<Vec<MemberProfileView>>();
    assert_eq!(all.len(), 2);

    let filtered = server
        .get(&format!(
            "/api/communities/{community_id}/members?stage=practitioner&kind=remote"
        ))
        .await
        .json::<Vec<MemberProfileView>>();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].username, joiner.username);

    let none = server
        .get(&format!(
            "/api/communities/{community_id}/members?stage=mentor"
        ))
        .await
        .json::<Vec<MemberProfileView>>();
    assert!(none.is_empty());

    // leaving drops the membership
    let leave = server
        .post(&format!("/api/communities/{community_id}/leave"))
        .await;
    leave.assert_status_success();
    let after_leave = server
        .get(&format!("/api/communities/{community_id}/members"))
        .await
        .json::<Vec<MemberProfileView>>();
    assert_eq!(after_leave.len(), 1);
    assert_eq!(after_leave[0].username, creator.username);
});
