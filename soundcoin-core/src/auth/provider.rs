// File: soundcoin-core/src/auth/provider.rs

use std::collections::HashMap;
use std::sync::Arc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;
use soundcoin_common::traits::repository_traits::ProfileRepository;
use crate::http::{HttpClient, HttpResponse};
use crate::Error;

#[derive(Debug, Clone)]
pub struct AuthProviderConfig {
    /// Base URL, without a trailing `/auth/v1`.
    pub base_url: String,
    pub api_key: String,
}

pub struct AuthProvider {
    config: AuthProviderConfig,
    http: Arc<dyn HttpClient>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthProvider {
    pub fn new(
        config: AuthProviderConfig,
        http: Arc<dyn HttpClient>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self { config, http, profiles }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("apikey".to_string(), self.config.api_key.clone());
        headers
    }

    /// Relays a signup. The upstream reply is returned untouched; on success a
    /// zero-coin profile is created for the new user if missing.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<HttpResponse, Error> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let resp = self
            .http
            .post(self.endpoint("/auth/v1/signup"), self.headers(), body.to_string())
            .await?;

        if resp.is_success() {
            match signup_user_id(&resp.body) {
                Some(user_id) => {
                    let username = full_name
                        .filter(|n| !n.trim().is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| default_username(email));
                    match self.profiles.ensure_profile(user_id, email, &username).await {
                        Ok(true) => info!("Created profile for new user {}", user_id),
                        Ok(false) => {}
                        Err(e) => warn!("Could not create profile for {}: {}", user_id, e),
                    }
                }
                None => warn!("Signup succeeded but no user id in provider reply"),
            }
        }
        Ok(resp)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<HttpResponse, Error> {
        let body = json!({ "email": email, "password": password });
        self.http
            .post(
                self.endpoint("/auth/v1/token?grant_type=password"),
                self.headers(),
                body.to_string(),
            )
            .await
    }
}

/// The provider answers either with the user object itself or wrapped in `user`.
fn signup_user_id(body: &str) -> Option<Uuid> {
    let v: Value = serde_json::from_str(body).ok()?;
    let id = v
        .get("user")
        .and_then(|u| u.get("id"))
        .or_else(|| v.get("id"))?
        .as_str()?;
    Uuid::parse_str(id).ok()
}

fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use crate::test_utils::memory::MemoryStore;

    fn config() -> AuthProviderConfig {
        AuthProviderConfig {
            base_url: "https://auth.example/".into(),
            api_key: "anon-key".into(),
        }
    }

    #[tokio::test]
    async fn register_relays_reply_and_creates_profile() {
        let user_id = Uuid::new_v4();
        let reply = json!({ "user": { "id": user_id.to_string(), "email": "a@b.c" } }).to_string();

        let mut http = MockHttpClient::new();
        let reply_clone = reply.clone();
        http.expect_post()
            .withf(|url, headers, body| {
                url == "https://auth.example/auth/v1/signup"
                    && headers.get("apikey").map(String::as_str) == Some("anon-key")
                    && body.contains("\"full_name\":\"Ada\"")
            })
            .times(1)
            .returning(move |_, _, _| Ok(HttpResponse { status: 200, body: reply_clone.clone() }));

        let store = Arc::new(MemoryStore::new());
        let provider = AuthProvider::new(config(), Arc::new(http), store.clone());

        let resp = provider.register("a@b.c", "hunter22", Some("Ada")).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, reply);

        let profile = store.get_profile(user_id).await.unwrap().expect("profile created");
        assert_eq!(profile.coins, 0);
        assert_eq!(profile.username, "Ada");
    }

    #[tokio::test]
    async fn failed_signup_is_relayed_without_profile() {
        let mut http = MockHttpClient::new();
        http.expect_post()
            .returning(|_, _, _| Ok(HttpResponse { status: 422, body: r#"{"msg":"weak password"}"#.into() }));

        let store = Arc::new(MemoryStore::new());
        let provider = AuthProvider::new(config(), Arc::new(http), store.clone());

        let resp = provider.register("a@b.c", "x", None).await.unwrap();
        assert_eq!(resp.status, 422);
        assert_eq!(store.count_profiles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn login_uses_password_grant() {
        let mut http = MockHttpClient::new();
        http.expect_post()
            .withf(|url, _, body| {
                url == "https://auth.example/auth/v1/token?grant_type=password"
                    && body.contains("\"email\":\"a@b.c\"")
            })
            .times(1)
            .returning(|_, _, _| Ok(HttpResponse { status: 400, body: r#"{"error":"invalid_grant"}"#.into() }));

        let provider = AuthProvider::new(config(), Arc::new(http), Arc::new(MemoryStore::new()));
        let resp = provider.login("a@b.c", "nope").await.unwrap();
        assert_eq!(resp.status, 400);
        assert!(resp.body.contains("invalid_grant"));
    }

    #[test]
    fn user_id_found_at_top_level_or_nested() {
        let id = Uuid::new_v4();
        assert_eq!(signup_user_id(&json!({ "id": id.to_string() }).to_string()), Some(id));
        assert_eq!(signup_user_id(&json!({ "user": { "id": id.to_string() } }).to_string()), Some(id));
        assert_eq!(signup_user_id("not json"), None);
    }
}
