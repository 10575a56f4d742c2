//! In-process stand-in for the recipe API used by the integration tests.
//!
//! Every request is recorded, then answered from a per-route reply table
//! that tests can override.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use client::{MemoryTokenStorage, RecipeApiClient, SessionStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
struct Reply {
    status: StatusCode,
    body: Value,
    delay: Option<Duration>,
}

/// One request as the stub saw it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub route: String,
    pub path: String,
    pub auth: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubApi {
    pub base_url: String,
    state: Arc<StubState>,
}

pub fn pancakes() -> Value {
    json!({
        "_id": "r1",
        "title": "Pancakes",
        "ist": "Mix and fry",
        "ing1": "flour",
        "ing2": "milk",
        "qty1": "2 cups",
        "imgUrl": "https://img.example/pancakes.png",
        "user": "u1"
    })
}

pub fn soup() -> Value {
    json!({ "_id": "r2", "title": "Soup", "ist": "Boil", "user": "u2" })
}

fn default_replies() -> HashMap<String, Reply> {
    let ok = |body: Value| Reply {
        status: StatusCode::OK,
        body,
        delay: None,
    };
    HashMap::from([
        ("GET /".to_string(), ok(json!({ "recipe": [pancakes()] }))),
        ("GET /saved".to_string(), ok(json!({ "recipe": [soup()] }))),
        (
            "GET /user".to_string(),
            ok(json!({ "user": { "_id": "u1", "name": "Ada", "email": "a@b.com" } })),
        ),
        (
            "POST /login".to_string(),
            ok(json!({ "message": "Welcome Ada", "token": "xyz", "success": true })),
        ),
        (
            "POST /register".to_string(),
            ok(json!({ "message": "Registered", "token": "reg-token", "success": true })),
        ),
        (
            "POST /add".to_string(),
            Reply {
                status: StatusCode::CREATED,
                body: json!({ "message": "Recipe added", "success": true }),
                delay: None,
            },
        ),
        ("GET /:id".to_string(), ok(json!({ "recipe": pancakes() }))),
        (
            "POST /:id".to_string(),
            ok(json!({ "message": "Recipe saved", "success": true })),
        ),
    ])
}

fn route_key(method: &Method, path: &str) -> String {
    let known = if *method == Method::GET {
        ["/", "/saved", "/user"].contains(&path)
    } else if *method == Method::POST {
        ["/login", "/register", "/add"].contains(&path)
    } else {
        false
    };
    if known {
        format!("{method} {path}")
    } else {
        format!("{method} /:id")
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path());
    let path = if path.is_empty() { "/" } else { path };
    let route = route_key(&method, path);

    state.requests.lock().unwrap().push(RecordedRequest {
        route: route.clone(),
        path: path.to_string(),
        auth: headers
            .get("auth")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let reply = state.replies.lock().unwrap().get(&route).cloned();
    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "no such route" }))).into_response();
    };
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    (reply.status, Json(reply.body)).into_response()
}

impl StubApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState {
            replies: Mutex::new(default_replies()),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub api server");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn reply(&self, route: &str, status: StatusCode, body: Value) {
        self.reply_after(route, Duration::ZERO, status, body);
    }

    pub fn reply_after(&self, route: &str, delay: Duration, status: StatusCode, body: Value) {
        self.state.replies.lock().unwrap().insert(
            route.to_string(),
            Reply {
                status,
                body,
                delay: (!delay.is_zero()).then_some(delay),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, route: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.route == route)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }

    pub fn api(&self) -> RecipeApiClient {
        RecipeApiClient::new(&self.base_url).expect("api client")
    }

    pub fn store(&self, storage: Arc<MemoryTokenStorage>) -> SessionStore {
        SessionStore::new(self.api(), storage)
    }
}
