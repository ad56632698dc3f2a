//! Application state, router assembly, and the serve loop.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use facture_storage::Store;

use crate::config::ServerConfig;
use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: ServerConfig,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.client_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        // Invoices, owner-scoped surface
        .route("/invoices", post(handlers::invoices::create))
        .route("/invoices/my", get(handlers::invoices::list_mine))
        .route("/invoices/all", get(handlers::admin_invoices::list_all))
        .route(
            "/invoices/{id}",
            get(handlers::invoices::get_one)
                .put(handlers::invoices::update)
                .delete(handlers::invoices::delete),
        )
        .route(
            "/invoices/{id}/status",
            patch(handlers::admin_invoices::update_status),
        )
        // Invoices, admin surface (any invoice)
        .route("/admin/invoices/all", get(handlers::admin_invoices::list_all))
        .route(
            "/admin/invoices/{id}",
            get(handlers::admin_invoices::get_any)
                .put(handlers::admin_invoices::update_any)
                .delete(handlers::admin_invoices::delete_any),
        )
        .route(
            "/admin/invoices/{id}/status",
            patch(handlers::admin_invoices::update_status),
        )
        // User management (admin only)
        .route("/users", get(handlers::users::list))
        .route("/users/{id}", delete(handlers::users::delete))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "OK"}))
}

pub async fn serve(state: AppState, listen: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("facture server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
