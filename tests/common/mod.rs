//! Shared fixtures for the integration tests: stub catalog, shop and
//! identity provider servers plus helpers to build and drive the app.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use shopping_assistant::agent::{AgentError, AssistantTurn, ChatModel, Message};
use shopping_assistant::app_state::{AppState, SharedState};
use shopping_assistant::config::Config;
use shopping_assistant::router::create_app_router;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Chat model replaying scripted turns and recording what it was shown.
/// An exhausted script fails like an unreachable provider.
#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    turns: Mutex<VecDeque<AssistantTurn>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedChatModel {
    pub fn new(turns: Vec<AssistantTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::default(),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![AssistantTurn::text(text)])
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[Value],
    ) -> Result<AssistantTurn, AgentError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::Provider("script exhausted".to_string()))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Catalog stub knowing `apple` (0.50) and `TS001` (19.99).
pub async fn spawn_catalog() -> String {
    fn lookup(code: &str) -> Option<Value> {
        match code {
            "apple" => Some(json!({
                "id": "apple",
                "name": "Apple",
                "price": 0.5,
                "category": "Produce",
                "inStock": true
            })),
            "TS001" => Some(json!({
                "id": "TS001",
                "name": "Classic Cotton T-Shirt",
                "price": 19.99,
                "category": "Apparel"
            })),
            _ => None,
        }
    }

    let router = Router::new().route(
        "/api/catalog",
        post(|Json(body): Json<Value>| async move {
            let code = body["productCode"].as_str().unwrap_or_default();
            match lookup(code) {
                Some(product) => (StatusCode::OK, Json(json!({ "product": product }))),
                None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Product not found" }))),
            }
        })
        .get(|Query(params): Query<HashMap<String, String>>| async move {
            let products: Vec<Value> = ["apple", "TS001"]
                .iter()
                .filter_map(|code| lookup(code))
                .filter(|p| match params.get("search") {
                    Some(search) => p["id"].as_str().unwrap_or_default().contains(search.as_str()),
                    None => true,
                })
                .collect();
            let total = products.len();
            Json(json!({ "products": products, "pagination": { "total": total } }))
        }),
    );
    format!("{}/api/catalog", spawn_stub(router).await)
}

/// One request the shop stub received.
#[derive(Debug, Clone)]
pub struct ShopOrder {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct ShopStub {
    pub orders: Arc<Mutex<Vec<ShopOrder>>>,
}

impl ShopStub {
    pub fn orders(&self) -> Vec<ShopOrder> {
        self.orders.lock().unwrap().clone()
    }
}

async fn place_order(
    State(shop): State<ShopStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    shop.orders.lock().unwrap().push(ShopOrder {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    Json(json!({ "orderId": "order-1", "status": "confirmed" }))
}

/// Shop API stub accepting every order.
pub async fn spawn_shop() -> (String, ShopStub) {
    let shop = ShopStub::default();
    let router = Router::new()
        .route("/api/checkout", post(place_order))
        .with_state(shop.clone());
    (format!("{}/api/checkout", spawn_stub(router).await), shop)
}

/// Identity provider stub that answers the token poll with `token_status`
/// and `token_body` (after one `authorization_pending`).
pub async fn spawn_identity(token_status: StatusCode, token_body: Value) -> String {
    let polls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/bc-authorize",
            post(|| async {
                Json(json!({ "auth_req_id": "req-42", "expires_in": 120, "interval": 0 }))
            }),
        )
        .route(
            "/oauth/token",
            post(move || {
                let polls = polls.clone();
                let body = token_body.clone();
                async move {
                    if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::BAD_REQUEST, Json(json!({ "error": "authorization_pending" })))
                    } else {
                        (token_status, Json(body))
                    }
                }
            }),
        );
    spawn_stub(router).await
}

/// Builds a config from `vars` on top of test defaults.
pub fn config(vars: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = HashMap::from([
        ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ("BIND_ADDR".to_string(), "127.0.0.1:0".to_string()),
        ("CIBA_POLL_INTERVAL_MS".to_string(), "5".to_string()),
        ("CIBA_TIMEOUT_MS".to_string(), "5000".to_string()),
        ("SHOP_API_AUDIENCE".to_string(), "https://shop.example.com".to_string()),
    ]);
    for (k, v) in vars {
        map.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| map.get(key).cloned()).expect("valid test config")
}

/// A router over fresh state, for `oneshot` requests.
pub fn app(config: Config, model: Arc<dyn ChatModel>) -> (axum::Router, SharedState) {
    let state = AppState::with_model(config, reqwest::Client::new(), model).shared();
    (create_app_router(state.clone()), state)
}

/// Serves the app on a local port so tools can call back into it. The
/// config's `APP_BASE_URL` is pointed at the served address.
pub async fn serve_app(vars: &[(&str, &str)], model: Arc<dyn ChatModel>) -> (String, SharedState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let mut vars = vars.to_vec();
    vars.push(("APP_BASE_URL", base.as_str()));
    let (router, state) = app(config(&vars), model);

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    (base, state)
}

/// Sends a JSON request through the router and decodes the JSON response.
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(json!({}));

    (status, body)
}

/// Posts a chat message as `user_id` to a served app.
pub async fn chat(base: &str, user_id: &str, content: &str) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", base))
        .header("x-user-id", user_id)
        .json(&json!({ "messages": [{ "role": "user", "content": content }] }))
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap_or(json!({})))
}
