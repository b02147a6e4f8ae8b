//! Demo server for the Inertia.js adapter.
//!
//! ```text
//!     Client ──▶ TraceLayer ──▶ InertiaLayer ──▶ share_request ──▶ handlers
//!                                    │                               │
//!                                    │                        Inertia::render
//!                                    ▼                               │
//!     Client ◀────────────── protocol rules ◀──── ResponseBuffer ◀───┘
//! ```
//!
//! # Routes
//! - `GET /`           renders `Home` with deferred, lazy, and always props
//! - `POST /users`     redirects through `Inertia::location`
//! - `PUT /users/{id}` answers `302`; the middleware rewrites it to `303`
//! - `POST /ping`      answers an empty `200`; the middleware sends the client back

use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header::LOCATION, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use inertia_bridge::{
    config::{load_config, InertiaConfig},
    observability::init_logging,
    render::template::TemplateData,
    with_props, with_template_data, Inertia, InertiaBuilder, InertiaError, Prop, Props,
    RequestContext, TemplateValue,
};

#[derive(Debug, Parser)]
#[command(name = "inertia-bridge", about = "Inertia.js adapter demo server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => InertiaConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!(
        root_template = %config.root_template,
        ssr_enabled = config.ssr.enabled,
        "Configuration loaded"
    );

    let inertia = InertiaBuilder::from_config(&config)
        .share_prop("app", json!({ "name": "inertia-bridge" }))
        .share_template_data("title", "inertia-bridge")
        .build()?;

    let app = Router::new()
        .route("/", get(home))
        .route("/users", post(create_user))
        .route("/users/{id}", put(update_user))
        .route("/ping", post(ping))
        .layer(middleware::from_fn(share_request))
        .layer(inertia.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(inertia);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Attach per-request props and template data.
async fn share_request(mut req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    with_props(&mut req, Props::new().with("path", path));

    let mut data = TemplateData::new();
    data.insert("lang".to_string(), TemplateValue::from("en"));
    with_template_data(&mut req, data);

    next.run(req).await
}

async fn home(State(inertia): State<Inertia>, ctx: RequestContext) -> Result<Response, InertiaError> {
    let props = Props::new()
        .with("greeting", "Hello from inertia-bridge")
        .with("users", Prop::deferred(|| json!([{ "id": 1, "name": "Ada" }])))
        .with("report", Prop::lazy(|| json!({ "visits": 42 })))
        .with("flash", Prop::always(|| json!(null)));

    inertia.render_response(&ctx, "Home", props).await
}

async fn create_user(State(inertia): State<Inertia>, ctx: RequestContext) -> Result<Response, InertiaError> {
    inertia.location_response(&ctx, "/")
}

async fn update_user(Path(id): Path<u64>) -> impl IntoResponse {
    tracing::debug!(id, "User updated");
    (StatusCode::FOUND, [(LOCATION, "/")])
}

async fn ping() -> StatusCode {
    StatusCode::OK
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
