use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use socialnet_api::app::{build_app, services::AppServices};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory storage, ephemeral port.
        let app = build_app(AppServices::in_memory(JWT_SECRET));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str) -> serde_json::Value {
        let res = self
            .client
            .post(self.url("/users"))
            .json(&json!({
                "name": format!("{username} name"),
                "username": username,
                "email": format!("{username}@example.com"),
                "pass": "secret",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn login(&self, username: &str, pass: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .json(&json!({ "email": format!("{username}@example.com"), "pass": pass }))
            .send()
            .await
            .unwrap()
    }

    /// Register `username` and return (id, token).
    async fn signup(&self, username: &str) -> (String, String) {
        let user = self.register(username).await;
        let res = self.login(username, "secret").await;
        assert_eq!(res.status(), StatusCode::OK);
        let token = res.text().await.unwrap();
        (user["id"].as_str().unwrap().to_string(), token)
    }

    async fn create_post(&self, token: &str, title: &str) -> String {
        let res = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": "hello" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, sub: &str, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": sub,
        "iat": now.timestamp(),
        "exp": (now + expires_in).timestamp(),
        "authorized": true,
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_returns_created_user_without_password() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/users"))
        .json(&json!({"name":"A","username":"a","email":"a@a.com","pass":"x"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["username"], "a");
    assert!(body.get("pass").is_none());
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/users"))
        .json(&json!({"name":"  ","username":"a","email":"a@a.com","pass":"x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "name is required");

    let res = srv
        .client
        .post(srv.url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_a_server_error_with_database_message() {
    let srv = TestServer::spawn().await;
    srv.register("dup").await;

    let res = srv
        .client
        .post(srv.url("/users"))
        .json(&json!({"name":"B","username":"other","email":"dup@example.com","pass":"x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("users_email_key"));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;

    let res = srv.login("ana", "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = srv.login("nobody", "secret").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_email_login_costs_as_much_as_a_wrong_password() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;
    // warm up
    srv.login("ana", "wrong").await;

    let start = std::time::Instant::now();
    let res = srv.login("ana", "wrong").await;
    let known = start.elapsed();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let start = std::time::Instant::now();
    let res = srv.login("nobody", "wrong").await;
    let unknown = start.elapsed();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert!(unknown * 4 >= known, "unknown {unknown:?} vs known {known:?}");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let srv = TestServer::spawn().await;
    let (id, _) = srv.signup("ana").await;

    let res = srv.client.get(srv.url("/posts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = srv
        .client
        .get(srv.url("/posts"))
        .header("authorization", "Token abc")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("some-other-secret", &id, ChronoDuration::hours(1));
    let res = srv
        .client
        .get(srv.url("/posts"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(JWT_SECRET, &id, ChronoDuration::seconds(-5));
    let res = srv
        .client
        .get(srv.url("/posts"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let valid = mint_jwt(JWT_SECRET, &id, ChronoDuration::hours(1));
    let res = srv
        .client
        .get(srv.url("/posts"))
        .bearer_auth(valid)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn users_cannot_modify_other_accounts() {
    let srv = TestServer::spawn().await;
    let (_, ana_token) = srv.signup("ana").await;
    let (bob_id, _) = srv.signup("bob").await;

    let res = srv
        .client
        .put(srv.url(&format!("/users/{bob_id}")))
        .bearer_auth(&ana_token)
        .json(&json!({"name":"x","username":"x","email":"x@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{bob_id}")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url(&format!("/users/{bob_id}/update-password")))
        .bearer_auth(&ana_token)
        .json(&json!({"current":"secret","new":"hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "You cannot change another user's password");
}

#[tokio::test]
async fn update_and_search_own_profile() {
    let srv = TestServer::spawn().await;
    let (id, token) = srv.signup("ana").await;

    let res = srv
        .client
        .put(srv.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .json(&json!({"name":" Ana Maria ","username":"anamaria","email":"ana@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv
        .client
        .get(srv.url("/users?user=MARIA"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Ana Maria");
    assert!(users[0].get("pass").is_none());
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let srv = TestServer::spawn().await;
    let (id, token) = srv.signup("ana").await;
    let path = format!("/users/{id}/update-password");

    let res = srv
        .client
        .post(srv.url(&path))
        .bearer_auth(&token)
        .json(&json!({"current":"wrong","new":"next"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .post(srv.url(&path))
        .bearer_auth(&token)
        .json(&json!({"current":"secret","new":"next"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(srv.login("ana", "secret").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(srv.login("ana", "next").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn follow_rules() {
    let srv = TestServer::spawn().await;
    let (ana_id, ana_token) = srv.signup("ana").await;
    let (bob_id, _) = srv.signup("bob").await;

    let res = srv
        .client
        .post(srv.url(&format!("/users/{ana_id}/follow")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{ana_id}/unfollow")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let res = srv
            .client
            .post(srv.url(&format!("/users/{bob_id}/follow")))
            .bearer_auth(&ana_token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let followers: Vec<serde_json::Value> = srv
        .client
        .get(srv.url(&format!("/users/{bob_id}/followers")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["id"], ana_id.as_str());

    let following: Vec<serde_json::Value> = srv
        .client
        .get(srv.url(&format!("/users/{ana_id}/following")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["id"], bob_id.as_str());

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{bob_id}/unfollow")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn missing_post_is_a_zero_valued_200() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.signup("ana").await;

    let res = srv
        .client
        .get(srv.url("/posts/0190a8b4-7c1e-7000-8000-000000000000"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(body["title"], "");
    assert_eq!(body["likes"], 0);

    let res = srv
        .client
        .get(srv.url("/posts/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_likes_and_post_ownership() {
    let srv = TestServer::spawn().await;
    let (ana_id, ana_token) = srv.signup("ana").await;
    let (bob_id, bob_token) = srv.signup("bob").await;
    let (_, eve_token) = srv.signup("eve").await;

    let own = srv.create_post(&ana_token, "ana's").await;
    let bobs = srv.create_post(&bob_token, "bob's").await;
    srv.create_post(&eve_token, "eve's").await;

    let res = srv
        .client
        .post(srv.url(&format!("/users/{bob_id}/follow")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let feed: Vec<serde_json::Value> = srv
        .client
        .get(srv.url("/posts"))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<_> = feed.iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, [bobs.as_str(), own.as_str()]);
    assert_eq!(feed[0]["authorUsername"], "bob");

    for path in ["like", "like", "unlike"] {
        let res = srv
            .client
            .post(srv.url(&format!("/posts/{bobs}/{path}")))
            .bearer_auth(&ana_token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
    let post: serde_json::Value = srv
        .client
        .get(srv.url(&format!("/posts/{bobs}")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["likes"], 1);

    let res = srv
        .client
        .put(srv.url(&format!("/posts/{bobs}")))
        .bearer_auth(&ana_token)
        .json(&json!({"title":"mine now","content":"x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .delete(srv.url(&format!("/posts/{bobs}")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .put(srv.url(&format!("/posts/{own}")))
        .bearer_auth(&ana_token)
        .json(&json!({"title":"  edited ","content":"body"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let posts: Vec<serde_json::Value> = srv
        .client
        .get(srv.url(&format!("/users/{ana_id}/posts")))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "edited");

    let res = srv
        .client
        .delete(srv.url(&format!("/posts/{own}")))
        .bearer_auth(&ana_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_own_account() {
    let srv = TestServer::spawn().await;
    let (id, token) = srv.signup("ana").await;

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let user: serde_json::Value = srv
        .client
        .get(srv.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["username"], "");
    assert_eq!(srv.login("ana", "secret").await.status(), StatusCode::UNAUTHORIZED);
}
