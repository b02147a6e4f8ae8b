//! Protocol middleware behavior through an axum router.

mod common;

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use inertia_bridge::{
    http::{X_INERTIA, X_INERTIA_LOCATION},
    Inertia, InertiaError, Page, Props, RequestContext,
};
use tower::ServiceExt;

use common::{body_bytes, empty, inertia, page_load, visit};

async fn users(
    axum::extract::State(inertia): axum::extract::State<Inertia>,
    ctx: RequestContext,
) -> Result<Response, InertiaError> {
    inertia
        .render_response(&ctx, "Users/Index", Props::new().with("count", 3))
        .await
}

async fn found() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/users")])
}

async fn nothing() -> StatusCode {
    StatusCode::OK
}

async fn broken_stream() -> Response {
    let chunks = futures_util::stream::once(async {
        Err::<Bytes, _>(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "stream reset"))
    });
    Response::new(Body::from_stream(chunks))
}

fn app() -> Router {
    let inertia = inertia();
    Router::new()
        .route("/users", get(users).post(nothing))
        .route("/users/{id}", put(found).patch(found).delete(found).get(found))
        .route("/created", post(|| async { (StatusCode::CREATED, "created") }))
        .route("/broken", post(broken_stream))
        .layer(inertia.layer())
        .with_state(inertia)
}

#[tokio::test]
async fn test_plain_request_passes_through_with_vary() {
    let response = app().oneshot(empty(page_load("/users/1"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/users");
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
}

#[tokio::test]
async fn test_visit_returns_json_page() {
    let response = app().oneshot(empty(visit("GET", "/users?page=2"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_INERTIA], "true");
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let page = Page::from_json(&body_bytes(response).await).unwrap();
    assert_eq!(page.component, "Users/Index");
    assert_eq!(page.props["count"], 3);
    assert_eq!(page.url, "/users?page=2");
    assert_eq!(page.version, "1");
}

#[tokio::test]
async fn test_stale_version_forces_reload() {
    let request = axum::http::Request::builder()
        .uri("/users?page=2")
        .header("X-Inertia", "true")
        .header("X-Inertia-Version", "stale")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.headers()[X_INERTIA_LOCATION], "/users?page=2");
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_empty_response_goes_back() {
    let request = visit("POST", "/users")
        .header(header::REFERER, "http://localhost/users/new")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response.headers()[X_INERTIA_LOCATION],
        "http://localhost/users/new"
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_failed_body_is_not_sent_back() {
    let request = visit("POST", "/broken")
        .header(header::REFERER, "http://localhost/form")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(X_INERTIA_LOCATION).is_none());
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_empty_response_without_referer_is_kept() {
    let response = app().oneshot(empty(visit("POST", "/users"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(X_INERTIA_LOCATION).is_none());
}

#[tokio::test]
async fn test_found_after_mutation_becomes_see_other() {
    for method in ["PUT", "PATCH", "DELETE"] {
        let response = app().oneshot(empty(visit(method, "/users/1"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method}");
        assert_eq!(response.headers()[header::LOCATION], "/users");
    }
}

#[tokio::test]
async fn test_found_after_get_is_unchanged() {
    let response = app().oneshot(empty(visit("GET", "/users/1"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/users");
}

#[tokio::test]
async fn test_other_responses_commit_verbatim() {
    let response = app().oneshot(empty(visit("POST", "/created"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(&body_bytes(response).await[..], b"created");
}
