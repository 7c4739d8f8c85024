//! In-process fake of the cooperative backend

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use coop_admin::{ApiClient, ClientConfig};
use coop_core::session::{FileKeyValueStore, SessionStore};

pub const TOKEN: &str = "tok-admin-1";

#[derive(Default)]
pub struct BackendState {
    pub records: Mutex<Vec<Value>>,
    /// Answer list requests with the `{datos, paginacion}` envelope
    pub envelope: AtomicBool,
    /// Reject every bearer token
    pub revoked: AtomicBool,

    pub login_calls: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,

    pub last_login_form: Mutex<Option<HashMap<String, String>>>,
    pub last_authorization: Mutex<Option<String>>,
    pub last_query: Mutex<HashMap<String, String>>,
}

impl BackendState {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn record(&self, id: i64) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r["id"] == json!(id))
            .cloned()
    }
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    pub async fn start(records: Vec<Value>) -> Self {
        let state = Arc::new(BackendState::default());
        *state.records.lock().unwrap() = records;

        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/me", get(me))
            .route("/api/v1/asociados", get(list).post(create))
            .route(
                "/api/v1/asociados/{id}",
                get(fetch).put(update).delete(remove),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Client wired to a fake backend with an on-disk session store
pub struct TestClient {
    pub dir: TempDir,
    pub config: ClientConfig,
    pub sessions: SessionStore,
    pub api: Arc<ApiClient>,
}

impl TestClient {
    pub async fn new(backend: &FakeBackend) -> Self {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::default()
            .with_api_url(backend.url())
            .with_data_dir(dir.path().join("session"));
        let storage = FileKeyValueStore::open(config.storage_path()).await.unwrap();
        let sessions = SessionStore::new(Arc::new(storage));
        let api = Arc::new(ApiClient::new(&config, sessions.clone()).unwrap());

        Self {
            dir,
            config,
            sessions,
            api,
        }
    }

    /// Store a valid session without going through the login endpoint
    pub async fn signed_in(backend: &FakeBackend) -> Self {
        let client = Self::new(backend).await;
        client
            .sessions
            .save(TOKEN, &coop_core::session::UserProfile::new("admin"))
            .await
            .unwrap();
        client
    }
}

pub fn associate(id: i64, nombres: &str, apellidos: &str, documento: &str) -> Value {
    json!({
        "id": id,
        "tipo_documento": "CC",
        "numero_documento": documento,
        "nombres": nombres,
        "apellidos": apellidos,
        "correo_electronico": format!("{}@coop.test", nombres.to_lowercase()),
        "estado": "activo",
        "fecha_ingreso": "2024-02-01"
    })
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn authorized(state: &BackendState, headers: &HeaderMap) -> bool {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ok = value.as_deref() == Some(&format!("Bearer {}", TOKEN)[..])
        && !state.revoked.load(Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = value;
    ok
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let valid = form.get("username").map(String::as_str) == Some("admin")
        && form.get("password").map(String::as_str) == Some("secret");
    *state.last_login_form.lock().unwrap() = Some(form);

    if !valid {
        return error(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    Json(json!({
        "id": 1,
        "username": "admin",
        "email": "admin@coop.test",
        "nombre_completo": "Administrador General",
        "rol": "admin",
        "is_active": true
    }))
    .into_response()
}

async fn list(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = query;
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let records = state.records.lock().unwrap().clone();
    if state.envelope.load(Ordering::SeqCst) {
        let total = records.len();
        Json(json!({
            "datos": records,
            "paginacion": {
                "total": total,
                "pagina_actual": 1,
                "por_pagina": 100,
                "total_paginas": 1
            }
        }))
        .into_response()
    } else {
        Json(Value::Array(records)).into_response()
    }
}

async fn fetch(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.get_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    match state.record(id) {
        Some(record) => Json(record).into_response(),
        None => error(StatusCode::NOT_FOUND, "Asociado no encontrado"),
    }
}

async fn create(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let mut records = state.records.lock().unwrap();
    if records
        .iter()
        .any(|r| r["numero_documento"] == body["numero_documento"])
    {
        return error(StatusCode::BAD_REQUEST, "duplicate document");
    }

    let id = records
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .max()
        .unwrap_or(0)
        + 1;
    body["id"] = json!(id);
    records.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    state.update_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let mut records = state.records.lock().unwrap();
    match records.iter_mut().find(|r| r["id"] == json!(id)) {
        Some(record) => {
            body["id"] = json!(id);
            *record = body.clone();
            Json(body).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Asociado no encontrado"),
    }
}

async fn remove(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let mut records = state.records.lock().unwrap();
    let before = records.len();
    records.retain(|r| r["id"] != json!(id));
    if records.len() == before {
        return error(StatusCode::NOT_FOUND, "Asociado no encontrado");
    }
    StatusCode::NO_CONTENT.into_response()
}
