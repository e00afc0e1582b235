//! In-process ARE server for transport tests
//!
//! Records every request it sees and answers REST calls with scripted
//! replies. Event-stream routes are added per test on top of [`MockAreServer::router`].

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::sse::{Event, Sse},
    Router,
};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

/// One request as the server saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub last_event_id: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap, body: String) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            method: method.to_string(),
            path: uri.path().to_string(),
            content_type: header("content-type"),
            accept: header("accept"),
            last_event_id: header("last-event-id"),
            body,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockAreServer {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<HashMap<String, (u16, String)>>>,
}

impl MockAreServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests to `path` (e.g. `/rest/runtime/model/state`) with `status` and `body`
    pub fn reply(&self, path: &str, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    /// Record a request made to a custom route
    pub fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::from_parts(method, uri, headers, String::new()));
    }

    /// Router answering every unrouted request from the scripted replies
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(scripted_reply)
            .with_state(self.clone())
    }
}

async fn scripted_reply(
    State(server): State<MockAreServer>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    server
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest::from_parts(&method, &uri, &headers, body));

    let reply = server.replies.lock().unwrap().get(uri.path()).cloned();
    match reply {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        ),
        None => (StatusCode::OK, String::new()),
    }
}

pub type EventBody = Sse<BoxStream<'static, Result<Event, Infallible>>>;

/// Event-stream response sending `events`, then ending or staying open
pub fn event_stream(events: Vec<Event>, keep_open: bool) -> EventBody {
    let events = stream::iter(events.into_iter().map(Ok::<_, Infallible>));
    let body = if keep_open {
        events.chain(stream::pending()).boxed()
    } else {
        events.boxed()
    };
    Sse::new(body)
}

/// An `event`-named event carrying `data`
pub fn are_event(data: &str) -> Event {
    Event::default().event("event").data(data)
}

/// Serve `router` on an ephemeral port; returns the `/rest/` base URI
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}/rest/", addr)
}

/// Base URI on a port nothing listens on
pub async fn unreachable_base_uri() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/rest/", addr)
}
