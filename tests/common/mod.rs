//! In-process stand-in for the BrokeCoin `/admin` API.
//!
//! Records live in memory as JSON values; every handled request bumps a
//! counter keyed by `"<METHOD> <route>"` so tests can assert exactly which
//! calls were made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;
use uuid::Uuid;

use brokecoin_admin::api::ApiClient;
use brokecoin_admin::dialog::MutationContext;
use brokecoin_admin::session::SessionStore;

pub const USERNAME: &str = "pitboss";
pub const PASSWORD: &str = "house-always-wins";
pub const TOKEN: &str = "mock-token-1";

#[derive(Debug)]
pub struct MockError {
    pub status: StatusCode,
    pub message: String,
}

impl MockError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        MockError {
            status,
            message: msg.into(),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Default)]
pub struct MockState {
    pub admin: Value,
    pub users: Vec<Value>,
    pub admins: Vec<Value>,
    pub transactions: Vec<Value>,
    pub tasks: Vec<Value>,
    pub comments: Vec<(Uuid, String)>,
    pub last_body: Option<Value>,
    /// When set, every bearer token is rejected.
    pub expired: bool,
    calls: HashMap<String, usize>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub url: Url,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            admin: json!({
                "id": Uuid::new_v4(),
                "username": USERNAME,
                "email": "pitboss@brokecoin.io",
                "role": "superadmin",
            }),
            ..MockState::default()
        }));

        let app = Router::new()
            .route("/api/admin/auth/login", post(login))
            .route("/api/admin/auth/profile", get(profile).patch(update_profile))
            .route("/api/admin/stats", get(stats))
            .route("/api/admin/users", get(list_users).post(create_user))
            .route(
                "/api/admin/users/:id",
                get(get_user).put(update_user).delete(delete_user),
            )
            .route("/api/admin/users/:id/balance", post(adjust_balance))
            .route("/api/admin/admins", get(list_admins))
            .route("/api/admin/transactions", get(list_transactions))
            .route(
                "/api/admin/transactions/:id/status",
                patch(update_transaction_status),
            )
            .route("/api/admin/tasks", get(list_tasks).post(create_task))
            .route(
                "/api/admin/tasks/:id",
                get(get_task).put(update_task).delete(delete_task),
            )
            .route("/api/admin/tasks/:id/status", patch(update_task_status))
            .route("/api/admin/tasks/:id/comments", post(add_comment))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            url: Url::parse(&format!("http://{addr}/api")).unwrap(),
            state,
        }
    }

    pub fn client(&self, session: SessionStore) -> ApiClient {
        ApiClient::with_base_url(self.url.clone(), session).unwrap()
    }

    /// Client whose session already holds a valid token.
    pub fn signed_in_client(&self) -> ApiClient {
        let session = SessionStore::in_memory();
        let admin = serde_json::from_value(self.state.lock().admin.clone()).unwrap();
        session.set_auth(TOKEN, admin).unwrap();
        self.client(session)
    }

    pub fn calls(&self, route: &str) -> usize {
        self.state.lock().calls.get(route).copied().unwrap_or(0)
    }

    pub fn expire_tokens(&self) {
        self.state.lock().expired = true;
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().users.push(user_json(id, username, None));
        id
    }

    pub fn add_admin(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().admins.push(user_json(id, username, None));
        id
    }

    pub fn add_transaction(&self, kind: &str, currency: &str, amount: f64) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().transactions.push(json!({
            "id": id,
            "user_id": Uuid::new_v4(),
            "type": kind,
            "amount": amount,
            "currency": currency,
            "status": "pending",
            "created_at": chrono::Utc::now(),
            "confirmed_at": null,
        }));
        id
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.lock().last_body.clone()
    }
}

pub fn context() -> MutationContext {
    MutationContext::default()
}

fn user_json(id: Uuid, username: &str, role: Option<&str>) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "wallet_address": format!("0x{}", &id.simple().to_string()[..12]),
        "chips_balance": 100,
        "brokecoin_balance": 2.5,
        "role": role,
        "status": "active",
        "created_at": "2024-04-01T10:00:00Z",
        "updated_at": null,
        "last_login": null,
    })
}

fn record(state: &Shared, route: &str) {
    *state.lock().calls.entry(route.to_string()).or_default() += 1;
}

fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), MockError> {
    let expected = format!("Bearer {TOKEN}");
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    if state.lock().expired || presented != Some(expected.as_str()) {
        return Err(MockError::new(StatusCode::UNAUTHORIZED, "Invalid token"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct Paging {
    page: Option<usize>,
    limit: Option<usize>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn paged(rows: &[Value], paging: &Paging) -> (Vec<Value>, usize) {
    let limit = paging.limit.unwrap_or(10).max(1);
    let page = paging.page.unwrap_or(1).max(1);
    let items = rows
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();
    (items, rows.len())
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Result<Json<Value>, MockError> {
    record(&state, "POST /auth/login");
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return Err(MockError::new(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let admin = state.lock().admin.clone();
    Ok(Json(json!({ "token": TOKEN, "admin": admin })))
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, MockError> {
    record(&state, "GET /auth/profile");
    authorize(&state, &headers)?;
    let admin = state.lock().admin.clone();
    Ok(Json(admin))
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "PATCH /auth/profile");
    authorize(&state, &headers)?;
    let mut s = state.lock();
    for field in ["username", "email"] {
        if let Some(value) = body.get(field) {
            s.admin[field] = value.clone();
        }
    }
    s.last_body = Some(body);
    Ok(Json(json!({ "success": true })))
}

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, MockError> {
    record(&state, "GET /stats");
    authorize(&state, &headers)?;
    let s = state.lock();
    let pending = s
        .transactions
        .iter()
        .filter(|t| t["status"] == "pending")
        .count();
    Ok(Json(json!({
        "totalUsers": s.users.len(),
        "totalTransactions": s.transactions.len(),
        "pendingTransactions": pending,
        "totalBalances": { "primary": 1250.5, "chips": 40000 },
    })))
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /users");
    authorize(&state, &headers)?;
    let (users, total) = paged(&state.lock().users, &paging);
    Ok(Json(json!({ "users": users, "total": total })))
}

async fn list_admins(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /admins");
    authorize(&state, &headers)?;
    let (admins, total) = paged(&state.lock().admins, &paging);
    Ok(Json(json!({ "admins": admins, "total": total })))
}

async fn get_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /users/:id");
    authorize(&state, &headers)?;
    let s = state.lock();
    s.users
        .iter()
        .find(|u| u["id"] == id.to_string())
        .cloned()
        .map(Json)
        .ok_or_else(|| MockError::new(StatusCode::NOT_FOUND, "User not found"))
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "POST /users");
    authorize(&state, &headers)?;
    let mut s = state.lock();
    if s.users.iter().any(|u| u["username"] == body["username"]) {
        return Err(MockError::new(StatusCode::CONFLICT, "Username already exists"));
    }
    let id = Uuid::new_v4();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    s.users.push(user_json(id, &username, None));
    s.last_body = Some(body);
    Ok(Json(json!({ "id": id })))
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "PUT /users/:id");
    authorize(&state, &headers)?;
    state.lock().last_body = Some(body);
    Ok(Json(json!({ "id": id })))
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MockError> {
    record(&state, "DELETE /users/:id");
    authorize(&state, &headers)?;
    let mut s = state.lock();
    let before = s.users.len();
    s.users.retain(|u| u["id"] != id.to_string());
    if s.users.len() == before {
        return Err(MockError::new(StatusCode::NOT_FOUND, "User not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn adjust_balance(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "POST /users/:id/balance");
    authorize(&state, &headers)?;
    state.lock().last_body = Some(body);
    Ok(Json(json!({ "success": true })))
}

async fn list_transactions(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /transactions");
    authorize(&state, &headers)?;
    let s = state.lock();
    let rows: Vec<Value> = s
        .transactions
        .iter()
        .filter(|t| paging.kind.as_deref().map_or(true, |k| t["type"] == k))
        .cloned()
        .collect();
    let limit = paging.limit.unwrap_or(10).max(1);
    let (items, total) = paged(&rows, &paging);
    Ok(Json(json!({
        "transactions": items,
        "totalPages": total.div_ceil(limit),
    })))
}

async fn update_transaction_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "PATCH /transactions/:id/status");
    authorize(&state, &headers)?;
    let mut s = state.lock();
    let status = body["status"].clone();
    let row = s
        .transactions
        .iter_mut()
        .find(|t| t["id"] == id.to_string())
        .ok_or_else(|| MockError::new(StatusCode::NOT_FOUND, "Transaction not found"))?;
    row["status"] = status;
    Ok(Json(json!({ "success": true })))
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(paging): Query<Paging>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /tasks");
    authorize(&state, &headers)?;
    let (tasks, total) = paged(&state.lock().tasks, &paging);
    let limit = paging.limit.unwrap_or(10).max(1);
    Ok(Json(json!({ "tasks": tasks, "total_pages": total.div_ceil(limit) })))
}

async fn get_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, MockError> {
    record(&state, "GET /tasks/:id");
    authorize(&state, &headers)?;
    let s = state.lock();
    s.tasks
        .iter()
        .find(|t| t["id"] == id.to_string())
        .cloned()
        .map(Json)
        .ok_or_else(|| MockError::new(StatusCode::NOT_FOUND, "Task not found"))
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "POST /tasks");
    authorize(&state, &headers)?;
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let mut task = body.clone();
    task["id"] = json!(id);
    task["created_at"] = json!(now);
    task["updated_at"] = json!(now);
    let mut s = state.lock();
    s.tasks.push(task);
    s.last_body = Some(body);
    Ok(Json(json!({ "id": id })))
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "PUT /tasks/:id");
    authorize(&state, &headers)?;
    state.lock().last_body = Some(body);
    Ok(Json(json!({ "id": id })))
}

async fn delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MockError> {
    record(&state, "DELETE /tasks/:id");
    authorize(&state, &headers)?;
    state.lock().tasks.retain(|t| t["id"] != id.to_string());
    Ok(StatusCode::NO_CONTENT)
}

async fn update_task_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "PATCH /tasks/:id/status");
    authorize(&state, &headers)?;
    state.lock().last_body = Some(body);
    Ok(Json(json!({ "success": true })))
}

async fn add_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, MockError> {
    record(&state, "POST /tasks/:id/comments");
    authorize(&state, &headers)?;
    let comment = body["comment"].as_str().unwrap_or_default().to_string();
    state.lock().comments.push((id, comment));
    Ok(Json(json!({ "success": true })))
}
