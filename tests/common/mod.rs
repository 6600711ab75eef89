// Shared fixtures: an in-process mock of the membership backend.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;
use wiseman_client::{ApiClient, AuthApi, ClientConfig, MemoryTokenStore, Session};

pub const GOOD_TOKEN: &str = "good-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const PASSWORD: &str = "correct-horse";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const SLOW_EMAIL: &str = "slow@example.com";

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

impl Hits {
    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Backend {
    pub base_url: Url,
    hits: Arc<AtomicUsize>,
}

impl Backend {
    /// Number of requests the mock has served.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
    }
}

pub struct Harness {
    pub backend: Backend,
    pub store: Arc<MemoryTokenStore>,
    pub session: Session,
    pub visits: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub async fn new(token: Option<&str>) -> Self {
        let backend = spawn_backend().await;
        Self::with_backend(backend, token)
    }

    pub fn with_backend(backend: Backend, token: Option<&str>) -> Self {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let visits = Arc::new(Mutex::new(Vec::new()));
        let sink = visits.clone();
        let session = Session::new(
            store.clone(),
            Arc::new(move |path: &str| sink.lock().unwrap().push(path.to_owned())),
        );
        Self {
            backend,
            store,
            session,
            visits,
        }
    }

    pub fn client(&self) -> ApiClient {
        self.client_with(self.backend.config())
    }

    pub fn client_with(&self, config: ClientConfig) -> ApiClient {
        ApiClient::new(&config, self.session.clone()).unwrap()
    }

    pub fn api(&self) -> AuthApi {
        AuthApi::new(self.client())
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

pub fn user_json(id: i64, email: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "name": "Ada Lovelace",
        "age": 36,
        "email": email,
        "phone": null,
        "street": null,
        "city": "London",
        "state": null,
        "zip": null,
        "country": "UK",
        "is_subscribed": true,
        "is_admin": is_admin,
        "created_at": "2024-05-01T10:20:30.123456",
        "updated_at": null
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn token(value: &str) -> Response {
    Json(json!({ "access_token": value, "token_type": "bearer" })).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn register(State(hits): State<Hits>, Json(body): Json<Value>) -> Response {
    hits.record();
    if body["email"] == TAKEN_EMAIL {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    token("registered-token")
}

async fn login(State(hits): State<Hits>, Json(body): Json<Value>) -> Response {
    hits.record();
    if body["email"] == SLOW_EMAIL {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if body["password"] == PASSWORD {
        token("login-token")
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
    }
}

async fn me(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    hits.record();
    match bearer(&headers) {
        Some(GOOD_TOKEN) => Json(user_json(1, "ada@example.com", false)).into_response(),
        Some(ADMIN_TOKEN) => Json(user_json(2, "admin@example.com", true)).into_response(),
        _ => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn newsletter(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    hits.record();
    match bearer(&headers) {
        Some(ADMIN_TOKEN) => Json(json!([
            user_json(1, "ada@example.com", false),
            user_json(3, "grace@example.com", false)
        ]))
        .into_response(),
        Some(GOOD_TOKEN) => detail(StatusCode::FORBIDDEN, "Not enough permissions"),
        _ => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn echo_auth(State(hits): State<Hits>, headers: HeaderMap) -> Json<Value> {
    hits.record();
    let values: Vec<&str> = headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    Json(json!({ "authorization": values }))
}

async fn slow(State(hits): State<Hits>) -> Json<Value> {
    hits.record();
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({}))
}

async fn boom(State(hits): State<Hits>) -> Response {
    hits.record();
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn forbidden(State(hits): State<Hits>) -> StatusCode {
    hits.record();
    StatusCode::FORBIDDEN
}

async fn odd_detail(State(hits): State<Hits>) -> Response {
    hits.record();
    detail(StatusCode::BAD_REQUEST, "Unknown server state")
}

async fn validation_list(State(hits): State<Hits>) -> Response {
    hits.record();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{
            "loc": ["body", "email"],
            "msg": "value is not a valid email address",
            "type": "value_error"
        }]})),
    )
        .into_response()
}

async fn coded(State(hits): State<Hits>) -> Response {
    hits.record();
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "age_out_of_range", "detail": "age: must be >= 18" })),
    )
        .into_response()
}

async fn not_json(State(hits): State<Hits>) -> &'static str {
    hits.record();
    "hello"
}

/// A raw server that answers every connection with `head` and `body_start`,
/// then holds the socket open without finishing the body.
pub async fn spawn_stalled_body(head: &'static str, body_start: &'static str) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body_start.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(3)).await;
            });
        }
    });
    format!("http://{addr}").parse().unwrap()
}

pub async fn spawn_backend() -> Backend {
    let hits = Hits::default();
    let app = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/newsletter", get(newsletter))
        .route("/echo-auth", get(echo_auth))
        .route("/slow", get(slow))
        .route("/boom", get(boom))
        .route("/forbidden", get(forbidden))
        .route("/odd", get(odd_detail))
        .route("/validation", get(validation_list))
        .route("/coded", get(coded))
        .route("/not-json", get(not_json))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Backend {
        base_url: format!("http://{addr}").parse().unwrap(),
        hits: hits.0,
    }
}
