// tests/api_tests.rs
//
// Drives the router in-process against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use soundcoin_common::models::{AdKind, LedgerEntry};
use soundcoin_common::traits::repository_traits::ProfileRepository;
use soundcoin_core::auth::AuthProviderConfig;
use soundcoin_core::economy::EconomyConfig;
use soundcoin_core::test_utils::MemoryStore;
use soundcoin_core::{Error, HttpClient, HttpResponse};
use soundcoin_server::api::build_router;
use soundcoin_server::{Repositories, ServerContext};

const TOKEN: &str = "Bearer test-token";

struct CannedAuth {
    status: u16,
    body: String,
}

#[async_trait]
impl HttpClient for CannedAuth {
    async fn post(&self, _url: String, _headers: HashMap<String, String>, _body: String) -> Result<HttpResponse, Error> {
        Ok(HttpResponse { status: self.status, body: self.body.clone() })
    }
}

fn repositories(store: &Arc<MemoryStore>) -> Repositories {
    Repositories {
        profiles: store.clone(),
        ledger: store.clone(),
        tracks: store.clone(),
        ads: store.clone(),
        ad_views: store.clone(),
        redemptions: store.clone(),
    }
}

fn context(store: &Arc<MemoryStore>, auth: CannedAuth) -> Arc<ServerContext> {
    Arc::new(ServerContext::assemble(
        repositories(store),
        EconomyConfig::default(),
        AuthProviderConfig { base_url: "http://auth.test".into(), api_key: "anon".into() },
        Arc::new(auth),
    ))
}

fn app_with_auth(store: &Arc<MemoryStore>, auth: CannedAuth) -> Router {
    build_router(context(store, auth))
}

fn app(store: &Arc<MemoryStore>) -> Router {
    app_with_auth(store, CannedAuth { status: 200, body: "{}".into() })
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("router is infallible")
}

async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).header("Authorization", TOKEN).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", TOKEN)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let resp = send(&app(&store), Request::builder().uri("/api/health").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn preflight_short_circuits_with_cors_headers() {
    let store = Arc::new(MemoryStore::new());
    let req = Request::builder().method("OPTIONS").uri("/api/redemptions").body(Body::empty()).unwrap();
    let resp = send(&app(&store), req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, PUT, PATCH, DELETE, OPTIONS");
    assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type, Authorization, If-None-Match");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn unknown_paths_and_methods_get_json_errors() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let resp = send(&app, get("/api/nowhere")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(body_json(resp).await["error"], "Path /api/nowhere not found");

    let resp = send(&app, get("/api/ads/view")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(resp).await["error"], "Method not allowed");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let req = Request::builder()
        .method("POST")
        .uri("/api/ads/view")
        .header("Content-Type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "Unauthorized");

    let req = Request::builder()
        .uri("/api/admin/stats")
        .header("Authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ad_view_credits_the_configured_reward() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let user = store.seed_profile(0).await;
    let ad = store.seed_ad(AdKind::Audio, 30, None);

    let resp = send(
        &app,
        post_json("/api/ads/view", json!({ "ad_id": ad.id, "track_id": null, "completed": true, "user_id": user })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["coins_earned"], 5);
    assert_eq!(store.get_balance(user).await.unwrap().unwrap().coins, 5);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let req = Request::builder()
        .method("POST")
        .uri("/api/redemptions")
        .header("Authorization", TOKEN)
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = send(&app(&store), req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn redemption_scenarios_over_http() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);

    let poor = store.seed_profile(500).await;
    let resp = send(
        &app,
        post_json(
            "/api/redemptions",
            json!({ "user_id": poor, "amount": 0.1, "coins_used": 1000, "method": "paypal", "paypal_email": "a@b.co" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Insufficient coins");
    assert_eq!(store.get_balance(poor).await.unwrap().unwrap().coins, 500);
    assert_eq!(store.redemption_count().await, 0);

    let rich = store.seed_profile(1200).await;
    let resp = send(
        &app,
        post_json(
            "/api/redemptions",
            json!({ "user_id": rich, "amount": 0.1, "coins_used": 1000, "method": "paypal", "paypal_email": "a@b.co" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["redemption"]["status"], "pending");
    assert_eq!(body["redemption"]["coins_used"], 1000);
    assert_eq!(store.get_balance(rich).await.unwrap().unwrap().coins, 200);

    let resp = send(&app, get(&format!("/api/redemptions?user_id={}", rich))).await;
    let listed = body_json(resp).await;
    assert_eq!(listed["redemptions"].as_array().map(Vec::len), Some(1));

    let id = body["redemption"]["id"].as_str().unwrap().to_string();
    let admin = Uuid::new_v4();
    let resp = send(
        &app,
        post_json(&format!("/api/admin/redemptions/{}/complete", id), json!({ "admin_id": admin })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(
        &app,
        post_json(&format!("/api/admin/redemptions/{}/approve", id), json!({ "admin_id": admin, "notes": "ok" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["redemption"]["status"], "approved");
    assert_eq!(store.get_balance(rich).await.unwrap().unwrap().coins, 200);
}

#[tokio::test]
async fn tiers_follow_the_coin_value() {
    let store = Arc::new(MemoryStore::new());
    let resp = send(&app(&store), get("/api/redemptions/tiers")).await;
    let body = body_json(resp).await;
    let tiers = body["tiers"].as_array().expect("tiers");
    assert_eq!(tiers.len(), 4);
    assert_eq!(tiers[0]["coins"], 1000);
    assert_eq!(tiers[0]["label"], "$0.10");
    assert_eq!(tiers[3]["label"], "$1.00");
}

#[tokio::test]
async fn admin_stats_count_rows() {
    let store = Arc::new(MemoryStore::new());
    store.seed_profile(0).await;
    store.seed_track("One", "jazz", 100);
    store.seed_track("Two", "jazz", 100);
    store.seed_ad(AdKind::Video, 30, None);

    let resp = send(&app(&store), get("/api/admin/stats")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "total_users": 1, "total_tracks": 2, "total_ads": 1, "pending_redemptions": 0 })
    );
}

#[tokio::test]
async fn tracks_can_be_listed_filtered_and_fetched() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let jazz = store.seed_track("Blue Hour", "jazz", 200);
    store.seed_track("Static", "noise", 90);

    let resp = send(&app, get("/api/tracks?genre=jazz&limit=5")).await;
    let body = body_json(resp).await;
    let tracks = body["tracks"].as_array().expect("tracks");
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0]["title"], "Blue Hour");

    let resp = send(&app, get(&format!("/api/tracks/{}", jazz.id))).await;
    assert_eq!(body_json(resp).await["track"]["genre"], "jazz");

    let resp = send(&app, get(&format!("/api/tracks/{}", Uuid::new_v4()))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["track"].is_null());

    let resp = send(&app, get("/api/tracks/not-a-uuid")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["track"].is_null());

    let resp = send(&app, get("/api/tracks/filters")).await;
    assert_eq!(body_json(resp).await["genres"], json!(["jazz", "noise"]));

    let resp = send(&app, get("/api/tracks?bpm_min=200&bpm_max=100")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn balance_supports_conditional_polling() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let user = store.seed_profile(40).await;

    let resp = send(&app, get(&format!("/api/profiles/{}/balance", user))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers()["etag"].to_str().unwrap().to_string();
    assert_eq!(etag, "\"1\"");
    assert_eq!(body_json(resp).await["coins"], 40);

    let req = Request::builder()
        .uri(format!("/api/profiles/{}/balance", user))
        .header("Authorization", TOKEN)
        .header("If-None-Match", etag.as_str())
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.status(), StatusCode::NOT_MODIFIED);

    let resp = send(&app, get(&format!("/api/profiles/{}/balance", Uuid::new_v4()))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn balance_stream_opens_with_the_current_balance() {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_profile(7).await;

    let resp = send(&app(&store), get(&format!("/api/profiles/{}/balance/stream", user))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");

    let mut frames = resp.into_body().into_data_stream();
    let first = frames.next().await.expect("a first frame").expect("frame bytes");
    let text = String::from_utf8_lossy(&first);
    assert!(text.contains("event: balance"), "got {text}");
    assert!(text.contains("\"coins\":7"), "got {text}");
}

#[tokio::test]
async fn balance_stream_delivers_own_update_amid_other_users_traffic() {
    let store = Arc::new(MemoryStore::new());
    let ctx = context(&store, CannedAuth { status: 200, body: "{}".into() });
    let app = build_router(ctx.clone());
    let listener = store.seed_profile(0).await;
    let busy = store.seed_profile(0).await;

    let resp = send(&app, get(&format!("/api/profiles/{}/balance/stream", listener))).await;
    let mut frames = resp.into_body().into_data_stream();
    frames.next().await.expect("initial frame").expect("frame bytes");

    for _ in 0..40 {
        ctx.ledger.apply(&LedgerEntry::ad_reward(busy, 1, Uuid::new_v4())).await.unwrap();
    }
    ctx.ledger.apply(&LedgerEntry::ad_reward(listener, 1, Uuid::new_v4())).await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("own balance update arrives")
        .expect("a frame")
        .expect("frame bytes");
    let text = String::from_utf8_lossy(&next);
    assert!(text.contains("event: balance"), "got {text}");
    assert!(text.contains("\"coins\":1"), "got {text}");
    assert!(text.contains(&listener.to_string()), "got {text}");
}

#[tokio::test]
async fn register_relays_the_provider_and_creates_a_profile() {
    let store = Arc::new(MemoryStore::new());
    let new_user = Uuid::new_v4();
    let app = app_with_auth(
        &store,
        CannedAuth { status: 200, body: json!({ "user": { "id": new_user } }).to_string() },
    );

    let resp = send(
        &app,
        post_json("/api/register", json!({ "email": "dj@example.com", "password": "pw", "full_name": "DJ" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user"]["id"], json!(new_user));

    let profile = store.get_profile(new_user).await.unwrap().expect("profile created");
    assert_eq!(profile.coins, 0);
    assert_eq!(profile.username, "DJ");
}

#[tokio::test]
async fn login_failures_keep_the_provider_status() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with_auth(
        &store,
        CannedAuth { status: 400, body: json!({ "error": "invalid_grant" }).to_string() },
    );
    let resp = send(&app, post_json("/api/login", json!({ "email": "x@y.z", "password": "nope" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid_grant");
}

#[tokio::test]
async fn player_session_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let app = app(&store);
    let user = store.seed_profile(0).await;
    let a = store.seed_track("A", "jazz", 100);
    let b = store.seed_track("B", "jazz", 100);

    let resp = send(
        &app,
        post_json("/api/player/sessions", json!({ "user_id": user, "queue": [a.id, b.id], "repeat": "all" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let opened = body_json(resp).await;
    assert_eq!(opened["state"]["repeat"], "all");
    let sid = opened["session_id"].as_str().unwrap().to_string();

    let resp = send(&app, post_json(&format!("/api/player/sessions/{}/play", sid), json!({ "index": 0 }))).await;
    let body = body_json(resp).await;
    assert_eq!(body["step"]["action"], "track");
    assert_eq!(body["step"]["track_id"], json!(a.id));

    let resp = send(&app, post_json(&format!("/api/player/sessions/{}/next", sid), json!({}))).await;
    assert_eq!(body_json(resp).await["step"]["index"], 1);

    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/api/player/sessions/{}/settings", sid))
        .header("Authorization", TOKEN)
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "ad_mode": "video" }).to_string()))
        .unwrap();
    assert_eq!(body_json(send(&app, req).await).await["state"]["ad_mode"], "video");

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/player/sessions/{}", sid))
        .header("Authorization", TOKEN)
        .body(Body::empty())
        .unwrap();
    assert_eq!(body_json(send(&app, req).await).await["success"], true);

    let resp = send(&app, get(&format!("/api/player/sessions/{}", sid))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
