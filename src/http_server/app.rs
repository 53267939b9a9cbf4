use std::sync::Arc;

use axum::{Router, routing::get};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::{
    database::Database,
    http_server::{http_routes, state::AppState},
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
}

async fn root() -> &'static str {
    "Concert catalog API"
}

pub fn router(app_state: Arc<AppState>) -> Router {
    // All origins permitted; the browser frontend is served from elsewhere
    let cors_layer = CorsLayer::permissive();

    Router::new()
        .route("/", get(root))
        .route(
            "/artists",
            get(http_routes::artists::list).post(http_routes::artists::create),
        )
        .route(
            "/artists/{id}",
            get(http_routes::artists::get_by_id)
                .put(http_routes::artists::update)
                .delete(http_routes::artists::remove),
        )
        .route(
            "/events",
            get(http_routes::events::list).post(http_routes::events::create),
        )
        .route(
            "/events/{id}",
            get(http_routes::events::get_by_id)
                .put(http_routes::events::update)
                .delete(http_routes::events::remove),
        )
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState {
        db: Arc::new(config.database),
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", config.port))?;
    log::info!("Backend listening on http://localhost:{}", config.port);
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
