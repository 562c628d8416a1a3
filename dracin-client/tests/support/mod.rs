//! Scripted stand-in for the admin API.
//!
//! Replies are queued per `"METHOD /path"`; the last queued reply keeps
//! answering once the others are used up. Every request that reaches the
//! fallback handler is recorded.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use dracin_client::{ApiClient, MemoryStore, SessionAction, SessionStore};
use dracin_config::ClientConfig;
use dracin_model::TokenGrant;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PREFIX: &str = "/api/admin";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Mutex<Vec<Recorded>>,
    replies: Mutex<HashMap<String, VecDeque<Canned>>>,
}

#[derive(Debug)]
pub struct MockServer {
    state: Arc<MockState>,
    base_url: String,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with(Router::new()).await
    }

    /// Serve `routes` (paths include [`PREFIX`]) ahead of the scripted
    /// fallback.
    pub async fn start_with(routes: Router) -> Self {
        let state = Arc::new(MockState::default());
        let app = routes.merge(
            Router::new().fallback(scripted).with_state(state.clone()),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{addr}{PREFIX}"),
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a JSON reply for `route`, e.g. `"GET /users"`.
    pub fn reply(&self, route: &str, status: u16, body: Value) {
        self.push(route, status, "application/json", body.to_string());
    }

    pub fn reply_raw(
        &self,
        route: &str,
        status: u16,
        content_type: &'static str,
        body: &str,
    ) {
        self.push(route, status, content_type, body.to_string());
    }

    fn push(
        &self,
        route: &str,
        status: u16,
        content_type: &'static str,
        body: String,
    ) {
        let canned = Canned {
            status: StatusCode::from_u16(status).unwrap(),
            content_type,
            body,
        };
        self.state
            .replies
            .lock()
            .entry(route.to_string())
            .or_default()
            .push_back(canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(Recorded::line).collect()
    }

    /// Client pointed at this server with an empty session.
    pub fn client(&self) -> ApiClient {
        let config = ClientConfig {
            api_base: self.base_url.clone(),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        };
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        ApiClient::new(&config, session).unwrap()
    }

    /// Client holding `access`/`refresh` tokens.
    pub fn signed_in_client(&self, access: &str, refresh: &str) -> ApiClient {
        let client = self.client();
        client.session().dispatch(SessionAction::SignedIn(TokenGrant {
            access_token: access.to_string(),
            refresh_token: Some(refresh.to_string()),
            user: None,
        }));
        client
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn scripted(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let route = format!("{method} {path}");

    state.requests.lock().push(Recorded {
        method,
        path,
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let canned = {
        let mut replies = state.replies.lock();
        match replies.get_mut(&route) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    match canned {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, canned.content_type)],
            canned.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            format!(r#"{{"code":404,"message":"no reply scripted for {route}"}}"#),
        )
            .into_response(),
    }
}
