//! Interactive web surface for the variant pipeline.

use std::num::NonZeroU16;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tokio::sync::Mutex;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{error, info};

use crate::cli::ServiceOptions;
use crate::clients::{CompletionClient, CompositorClient};
use crate::config::CampaignConfig;
use crate::constants::SESSION_INACTIVITY_MINUTES;
use crate::error::CopyforgeError;
use crate::session::SessionCache;

mod csrf;
pub(crate) mod flash;
mod images;
mod prelude;
mod views;

use views::{
    cancel_handler, clear_handler, download_handler, generate_handler, index_handler,
    render_handler, reset_selection_handler, toggle_handler,
};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    config: Arc<CampaignConfig>,
    variant_limit: usize,
    completion: CompletionClient,
    compositor: CompositorClient,
    session: Arc<Mutex<SessionCache>>,
    cancel: Arc<AtomicBool>,
}

impl AppState {
    fn new(options: &ServiceOptions) -> Result<Self, CopyforgeError> {
        let config = CampaignConfig::from_options(options);
        Ok(Self {
            completion: CompletionClient::new(options, config.credentials.completion_key.clone())?,
            compositor: CompositorClient::new(options, config.credentials.compositor_key.clone())?,
            variant_limit: options.variant_limit,
            config: Arc::new(config),
            session: Arc::new(Mutex::new(SessionCache::new())),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/variants", axum::routing::post(generate_handler))
        .route(
            "/variants/{index}/toggle",
            axum::routing::post(toggle_handler),
        )
        .route(
            "/selection/reset",
            axum::routing::post(reset_selection_handler),
        )
        .route("/images", axum::routing::post(render_handler))
        .route("/images/cancel", axum::routing::post(cancel_handler))
        .route("/images/{number}", axum::routing::get(download_handler))
        .route("/session/clear", axum::routing::post(clear_handler))
}

fn build_app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_INACTIVITY_MINUTES,
        )));
    create_router().with_state(state).layer(session_layer)
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

/// Serves the web surface until the listener fails.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    options: &ServiceOptions,
) -> Result<(), anyhow::Error> {
    let app = build_app(AppState::new(options)?);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
