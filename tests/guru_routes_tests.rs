mod helpers;

use helpers::create_fake_login_test_user;
use kindred_server::entities::guru::guru_question_entity::GuruQuestionView;
use kindred_server::entities::user_auth::local_user_entity::{
    LocalUserDbService, UserProfileView,
};
use kindred_server::middleware::ctx::Ctx;
use kindred_server::middleware::utils::string_utils::get_string_thing;
use uuid::Uuid;

async fn promote_to_guru(
    ctx_state: &kindred_server::middleware::mw_ctx::CtxState,
    user_id: &str,
) {
    LocalUserDbService {
        db: &ctx_state.db.client,
        ctx: &Ctx::new(Ok("test_admin".to_string()), Uuid::new_v4()),
    }
    .set_guru(get_string_thing(user_id.to_string()).unwrap(), true)
    .await
    .unwrap();
}

test_with_server!(gurus_listing_shows_only_gurus, |server, ctx_state, config| {
    let guru = create_fake_login_test_user(&server).await;
    create_fake_login_test_user(&server).await;
    promote_to_guru(&ctx_state, &guru.id).await;

    let response = server.get("/api/gurus").await;
    response.assert_status_success();
    let gurus = response.json::<Vec<UserProfileView>>();
    assert_eq!(gurus.len(), 1);
    assert_eq!(gurus[0].username, guru.username);
    assert!(gurus[0].is_guru);
});

test_with_server!(ask_and_answer_question, |server, ctx_state, config| {
    let guru = create_fake_login_test_user(&server).await;
    promote_to_guru(&ctx_state, &guru.id).await;
    let seeker = create_fake_login_test_user(&server).await;

    let asked = server
        .post(&format!("/api/gurus/{}/questions", guru.id))
        .json(&serde_json::json!({
            "question": "How do I begin a daily practice?",
        }))
        .await;
    asked.assert_status_success();
    let question = asked.json::<GuruQuestionView>();
    assert_eq!(question.asked_by_username, seeker.username);
    assert_eq!(question.guru_username, guru.username);
    assert!(question.answer.is_none());

    // the addressed guru answers
    let answered = server
        .post(&format!(
            "/api/guru-questions/{}/answer",
            question.id.to_raw()
        ))
        .add_header("Authorization", format!("Bearer {}", guru.token))
        .json(&serde_json::json!({
            "answer": "Start with two minutes.",
        }))
        .await;
    answered.assert_status_success();
    let view = answered.json::<GuruQuestionView>();
    assert_eq!(view.answer.as_deref(), Some("Start with two minutes."));
    assert!(view.answered_at.is_some());

    let listed = server
        .get(&format!("/api/gurus/{}/questions", guru.id))
        .await
        .json::<Vec<GuruQuestionView>>();
    assert_eq!(listed.len(), 1);
});

test_with_server!(only_addressed_guru_answers, |server, ctx_state, config| {
    let guru = create_fake_login_test_user(&server).await;
    promote_to_guru(&ctx_state, &guru.id).await;
    let seeker = create_fake_login_test_user(&server).await;

    let question = server
        .post(&format!("/api/gurus/{}/questions", guru.id))
        .json(&serde_json::json!({
            "question": "What should I read first?",
        }))
        .await
        .json::<GuruQuestionView>();

    // the asker cannot answer their own question
    let response = server
        .post(&format!(
            "/api/guru-questions/{}/answer",
            question.id.to_raw()
        ))
        .add_header("Authorization", format!("Bearer {}", seeker.token))
        .json(&serde_json::json!({
            "answer": "self-answer",
        }))
        .await;
    response.assert_status_forbidden();
});

test_with_server!(questions_go_to_gurus_only, |server, ctx_state, config| {
    let regular = create_fake_login_test_user(&server).await;
    create_fake_login_test_user(&server).await;

    let response = server
        .post(&format!("/api/gurus/{}/questions", regular.id))
        .json(&serde_json::json!({
            "question": "You are not a guru, are you?",
        }))
        .await;
    response.assert_status_failure();
});
