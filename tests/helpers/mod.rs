use axum_test::TestServer;
use fake::faker::internet::en::Username;
use fake::Fake;
use serde::Deserialize;

pub mod test_with_server;

#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

#[allow(dead_code)]
pub async fn create_login_test_user(server: &TestServer, username: String) -> AuthResponse {
    let create_user = server
        .post("/api/register")
        .json(&serde_json::json!({
            "username": username,
            "password": "some3242paSs#$",
        }))
        .await;
    create_user.assert_status_success();

    create_user.json::<AuthResponse>()
}

#[allow(dead_code)]
pub async fn create_fake_login_test_user(server: &TestServer) -> AuthResponse {
    let username: String = Username().fake::<String>().replace(['.', '-'], "_");
    create_login_test_user(server, username.to_lowercase()).await
}
