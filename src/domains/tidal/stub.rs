//! Scripted HTTP server standing in for TIDAL in [`TidalClient`] tests.
//!
//! Replies are served in order, whatever the request; every request is
//! recorded so tests can assert on what the client sent.
//!
//! [`TidalClient`]: super::TidalClient

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, HeaderName};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use serde_json::Value;

use crate::core::config::TidalConfig;

/// One canned response.
pub struct Reply {
    status: StatusCode,
    headers: Vec<(HeaderName, String)>,
    body: String,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in self.headers {
            headers.insert(name, HeaderValue::from_str(&value).unwrap());
        }
        (self.status, headers, self.body).into_response()
    }
}

/// A request as the server received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub form: Vec<(String, String)>,
}

impl Recorded {
    pub fn query(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    pub fn form(&self, name: &str) -> Option<&str> {
        lookup(&self.form, name)
    }

    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    let mut url = Url::parse("http://stub.invalid/").unwrap();
    url.set_query(Some(raw));
    url.query_pairs().into_owned().collect()
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Script>>;

/// A running stub server.
pub struct StubApi {
    base: String,
    script: Shared,
}

impl StubApi {
    /// Bind to an ephemeral local port and serve `replies` in order.
    pub async fn start(replies: Vec<Reply>) -> Self {
        let script: Shared = Arc::new(Mutex::new(Script {
            replies: replies.into(),
            requests: Vec::new(),
        }));
        let app = Router::new().fallback(respond).with_state(script.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            script,
        }
    }

    /// TIDAL configuration pointing both API and OAuth at this server.
    pub fn config(&self) -> TidalConfig {
        TidalConfig {
            client_id: Some("stub-client".to_string()),
            client_secret: Some("stub-secret".to_string()),
            api_url: format!("{}/v1", self.base),
            auth_url: format!("{}/oauth2", self.base),
            request_timeout_secs: 5,
            ..TidalConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.lock().unwrap().requests.clone()
    }
}

async fn respond(
    State(script): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut script = script.lock().unwrap();
    script.requests.push(Recorded {
        method,
        path: uri.path().to_string(),
        query: decode_pairs(uri.query().unwrap_or_default()),
        headers,
        form: decode_pairs(&String::from_utf8_lossy(&body)),
    });

    match script.replies.pop_front() {
        Some(reply) => reply.into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no scripted reply").into_response(),
    }
}
