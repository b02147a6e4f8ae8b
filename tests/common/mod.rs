//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use inertia_bridge::{Inertia, InertiaBuilder};
use tokio::net::TcpListener;

pub const ROOT_TEMPLATE: &str = "<html><head>{{ .inertiaHead }}</head><body>{{ .inertia }}</body></html>";

/// Pages received by a mock pre-render server.
pub type Received = Arc<Mutex<Vec<serde_json::Value>>>;

/// Start a mock pre-render server on an ephemeral port.
///
/// Every `POST /render` records the page and answers `status` with `body`.
pub async fn start_ssr_server(status: StatusCode, body: &'static str) -> (SocketAddr, Received) {
    start_ssr_server_with_delay(status, body, Duration::ZERO).await
}

/// Like [`start_ssr_server`], but each answer is delayed.
pub async fn start_ssr_server_with_delay(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> (SocketAddr, Received) {
    let received: Received = Arc::default();

    let handler = move |State(received): State<Received>, page: Bytes| async move {
        if let Ok(page) = serde_json::from_slice(&page) {
            received.lock().unwrap().push(page);
        }
        tokio::time::sleep(delay).await;
        (status, [("content-type", "application/json")], body)
    };

    let app = Router::new()
        .route("/render", post(handler))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Builder with the minimal root template and version `"1"`.
pub fn builder() -> InertiaBuilder {
    Inertia::builder("unused.html")
        .root_template_source(ROOT_TEMPLATE)
        .version("1")
}

pub fn inertia() -> Inertia {
    builder().build().unwrap()
}

/// Client-side visit to `uri`.
pub fn visit(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Inertia", "true")
        .header("X-Inertia-Version", "1")
}

/// Full page load of `uri`.
pub fn page_load(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn empty(builder: axum::http::request::Builder) -> Request<Body> {
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_string(response: impl IntoResponse) -> String {
    String::from_utf8(body_bytes(response.into_response()).await.to_vec()).unwrap()
}
