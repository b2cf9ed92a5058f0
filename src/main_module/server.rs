//! HTTP server initialization and routing

use axum::http::{HeaderValue, Method};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_router::configure_routes;
use crate::core::config::ServerConfig;
use crate::core::shared::state::AppState;
use crate::main_module::shutdown_signal;

/// Any origin when none are configured, otherwise only the listed ones.
pub fn create_cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors_allowed_origins.is_empty() {
        info!("Creating CORS layer accepting any origin");
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();
    info!("Creating CORS layer with {} configured origin(s)", origins.len());
    base.allow_origin(origins)
}

pub async fn run_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let server = app_state.config.server.clone();
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid listen address {}:{}: {e}", server.host, server.port),
            )
        })?;

    let app = configure_routes(app_state)
        .layer(create_cors_layer(&server))
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let config = ServerConfig {
            cors_allowed_origins: vec![
                "https://docs.example.com".to_string(),
                "bad\norigin".to_string(),
            ],
            ..ServerConfig::default()
        };
        // Building must not panic on the malformed entry.
        let _layer = create_cors_layer(&config);
        let _open = create_cors_layer(&ServerConfig::default());
    }
}
