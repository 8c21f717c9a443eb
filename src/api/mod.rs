//! HTTP surface over the loaded dataset.
//!
//! All routes are read-only. Handlers never touch the filesystem except the
//! raw-file endpoint; everything else answers from the shared `Dataset`.

pub mod error;
pub mod handlers;
pub mod schema;

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::state::AppState;

pub const API_V1_PREFIX: &str = "/api/v1";

/// Build the full application router.
pub fn router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        .route("/data", get(handlers::all_data))
        .route("/data/filtered", get(handlers::filtered_data))
        .route("/data/raw", get(handlers::raw_data))
        .route("/metrics", get(handlers::metrics))
        .route("/batt-aliases", get(handlers::batt_aliases))
        .route("/continents", get(handlers::continents))
        .route("/climates", get(handlers::climates))
        .route("/model-series", get(handlers::model_series));

    let mut app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest(API_V1_PREFIX, api)
        .with_state(state);

    match &config.static_dir {
        Some(dir) if dir.is_dir() => {
            info!("serving frontend from {}", dir.display());
            app = app.fallback_service(ServeDir::new(dir));
        }
        Some(dir) => warn!("STATIC_DIR {} is not a directory, ignoring", dir.display()),
        None => {}
    }

    app.layer(cors_layer(config))
        .layer(middleware::from_fn(log_requests))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    info!(
        "{method} {path} -> {} in {:.1?}",
        response.status().as_u16(),
        start.elapsed()
    );
    response
}
