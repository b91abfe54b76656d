//! An axum server that plays the part of the GitHub API in tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use gitdirclone::github::GitHubClient;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/octet-stream".into())],
            body: body.to_vec(),
        }
    }

    pub fn status(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: json!({ "message": message }).to_string().into_bytes(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A request the server received.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Path and query, e.g. `/repos/o/r/contents/docs?ref=main`.
    pub target: String,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct Fixture {
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Serves registered replies keyed by request target; anything else is a 404.
///
/// The server runs on its own tokio runtime so blocking clients can call it
/// from plain `#[test]` functions.
pub struct FixtureServer {
    base_url: String,
    fixture: Fixture,
    _runtime: Runtime,
}

impl FixtureServer {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let fixture = Fixture::default();

        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let app = Router::new()
            .fallback(respond)
            .with_state(fixture.clone());
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            fixture,
            _runtime: runtime,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route(&self, target: &str, reply: Reply) {
        self.fixture
            .routes
            .lock()
            .unwrap()
            .insert(target.to_string(), reply);
    }

    /// Register a directory listing at `/repos/{repo}/contents/{dir}?ref={branch}`.
    pub fn listing(&self, repo: &str, dir: &str, branch: &str, entries: Vec<Value>) {
        self.route(
            &format!("/repos/{}/contents/{}?ref={}", repo, dir, branch),
            Reply::json(Value::Array(entries)),
        );
    }

    /// Register a raw file and return its listing entry.
    pub fn file(&self, path: &str, content: &[u8]) -> Value {
        let raw = format!("/raw/{}", path);
        self.route(&raw, Reply::bytes(content));
        json!({
            "name": path.rsplit('/').next().unwrap(),
            "path": path,
            "type": "file",
            "size": content.len(),
            "download_url": format!("{}{}", self.base_url, raw),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.fixture.requests.lock().unwrap().clone()
    }

    /// A client pointed at this server, bypassing any configured proxy.
    pub fn client(&self, token: Option<&str>) -> GitHubClient {
        let http = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        GitHubClient::with_base_url(token.map(str::to_string), self.base_url())
            .unwrap()
            .http_client(http)
    }
}

/// A directory listing entry.
pub fn dir_entry(path: &str) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "type": "dir",
        "download_url": null,
    })
}

async fn respond(State(fixture): State<Fixture>, req: Request) -> Response {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    fixture.requests.lock().unwrap().push(Recorded {
        target: target.clone(),
        authorization,
    });

    let reply = fixture
        .routes
        .lock()
        .unwrap()
        .get(&target)
        .cloned()
        .unwrap_or_else(|| Reply::status(404, "Not Found"));

    let mut headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    let status = StatusCode::from_u16(reply.status).unwrap();

    (status, headers, reply.body).into_response()
}
