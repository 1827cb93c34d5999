//! In-process users API for integration tests.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use optimist_client::ApiClient;
use optimist_engine::{Resource, Role, User, UserDraft, UserPatch, UserStatus};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn user(id: &str, name: &str) -> User {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    User {
        id: id.into(),
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        avatar: None,
        role: Role::User,
        status: UserStatus::Active,
        created_at: at,
        updated_at: at,
    }
}

#[derive(Default)]
struct ApiState {
    users: Vec<User>,
    next_id: usize,
    /// One-shot canned response replacing the next request's
    respond_next: Option<(StatusCode, String)>,
    hold_next: bool,
    delay: Option<Duration>,
    last_query: HashMap<String, String>,
    last_auth: Option<String>,
}

/// Handle to a running fake API.
#[derive(Clone)]
pub struct FakeApi {
    state: Arc<Mutex<ApiState>>,
    release: Arc<Notify>,
    base_url: String,
}

impl FakeApi {
    /// Serve `users` on an ephemeral local port.
    pub async fn start(users: Vec<User>) -> Self {
        let state = Arc::new(Mutex::new(ApiState {
            next_id: users.len() + 1,
            users,
            ..ApiState::default()
        }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let api = FakeApi {
            state,
            release: Arc::new(Notify::new()),
            base_url: format!("http://{addr}/api"),
        };

        let app = Router::new()
            .route("/api/users", get(list).post(create))
            .route("/api/users/search", get(search))
            .route("/api/users/{id}", get(detail).put(update).delete(remove))
            .with_state(api.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        api
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    /// Answer the next request with `status` and a raw `body`.
    pub fn respond_next(&self, status: u16, body: &str) {
        self.state.lock().unwrap().respond_next =
            Some((StatusCode::from_u16(status).unwrap(), body.to_string()));
    }

    /// Fail the next request with a JSON error body.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.respond_next(status, &json!({ "message": message }).to_string());
    }

    /// Park the next request until [`release`](Self::release).
    pub fn hold_next(&self) {
        self.state.lock().unwrap().hold_next = true;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.state.lock().unwrap().last_query.clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.state.lock().unwrap().last_auth.clone()
    }

    /// Shared request prologue. Returns a response when the request should be
    /// answered with a canned one.
    async fn enter(&self, headers: &HeaderMap, query: HashMap<String, String>) -> Option<Response> {
        let (delay, hold) = {
            let mut state = self.state.lock().unwrap();
            state.last_query = query;
            state.last_auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            (state.delay, std::mem::take(&mut state.hold_next))
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if hold {
            self.release.notified().await;
        }

        let canned = self.state.lock().unwrap().respond_next.take();
        canned.map(|(status, body)| {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        })
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "User not found", "code": "NOT_FOUND" })),
    )
        .into_response()
}

async fn list(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(canned) = api.enter(&headers, query).await {
        return canned;
    }
    Json(api.users()).into_response()
}

async fn search(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let needle = query.get("q").cloned().unwrap_or_default().to_lowercase();
    if let Some(canned) = api.enter(&headers, query).await {
        return canned;
    }
    let found: Vec<User> = api
        .users()
        .into_iter()
        .filter(|u| u.name.to_lowercase().contains(&needle))
        .collect();
    Json(found).into_response()
}

async fn detail(State(api): State<FakeApi>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(canned) = api.enter(&headers, HashMap::new()).await {
        return canned;
    }
    match api.users().into_iter().find(|u| u.id == id) {
        Some(found) => Json(found).into_response(),
        None => not_found(),
    }
}

async fn create(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(draft): Json<UserDraft>,
) -> Response {
    if let Some(canned) = api.enter(&headers, HashMap::new()).await {
        return canned;
    }
    let mut state = api.state.lock().unwrap();
    let mut created = user(&state.next_id.to_string(), &draft.name);
    created.email = draft.email;
    created.role = draft.role.unwrap_or_default();
    created.created_at = Utc::now();
    created.updated_at = created.created_at;
    state.next_id += 1;
    state.users.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Response {
    if let Some(canned) = api.enter(&headers, HashMap::new()).await {
        return canned;
    }
    let mut state = api.state.lock().unwrap();
    match state.users.iter_mut().find(|u| u.id == id) {
        Some(found) => {
            found.apply_patch(&patch);
            found.touch(Utc::now());
            Json(found.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn remove(State(api): State<FakeApi>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(canned) = api.enter(&headers, HashMap::new()).await {
        return canned;
    }
    let mut state = api.state.lock().unwrap();
    let before = state.users.len();
    state.users.retain(|u| u.id != id);
    if state.users.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}
