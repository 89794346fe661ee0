//! BuildHub Backend
//!
//! REST backend for a construction project management platform: projects,
//! tasks, bidding, contractor/supplier registries, HR and global search.
//! SQLite persistence with Tantivy full-text search.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod search;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BuildHub Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (BUILDHUB_API_PSK). Authentication is disabled!");
    }
    if config.webhook_secret.is_none() {
        tracing::warn!(
            "No webhook secret configured (BUILDHUB_WEBHOOK_SECRET). Auth webhooks will be rejected!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from database
    tracing::info!("Building search index...");
    let tasks = repo.list_tasks(None, None, None).await?;
    let projects = repo.list_projects(None, None).await?;
    let users = repo.list_users().await?;
    search.rebuild(&tasks, &projects, &users).await?;

    // Create application state
    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Projects
        .route("/projects", get(api::list_projects))
        .route("/projects", post(api::create_project))
        .route("/projects/{id}", get(api::get_project))
        .route("/projects/{id}", put(api::update_project))
        .route("/projects/{id}", delete(api::delete_project))
        .route("/projects/{id}/members", post(api::add_project_member))
        .route("/projects/{id}/members", delete(api::remove_project_member))
        .route("/projects/{id}/attachments", post(api::add_project_attachment))
        .route(
            "/projects/{id}/attachments",
            delete(api::remove_project_attachment),
        )
        // Tasks
        .route("/tasks", get(api::list_tasks))
        .route("/tasks", post(api::create_task))
        .route("/tasks/{id}", get(api::get_task))
        .route("/tasks/{id}", put(api::update_task))
        .route("/tasks/{id}", delete(api::delete_task))
        .route("/tasks/{id}/status", patch(api::update_task_status))
        .route("/tasks/{id}/attachments", post(api::add_task_attachment))
        .route("/tasks/{id}/attachments", delete(api::remove_task_attachment))
        // Comments
        .route("/tasks/{id}/comments", get(api::list_comments))
        .route("/tasks/{id}/comments", post(api::create_comment))
        .route("/comments/{id}", delete(api::delete_comment))
        // Bids
        .route("/bids", get(api::list_bids))
        .route("/bids", post(api::create_bid))
        .route("/bids/{id}", get(api::get_bid))
        .route("/bids/{id}", delete(api::delete_bid))
        .route("/bids/{id}/status", patch(api::update_bid_status))
        // Opportunities
        .route("/opportunities", get(api::list_opportunities))
        .route("/opportunities", post(api::create_opportunity))
        .route("/opportunities/{id}", get(api::get_opportunity))
        .route("/opportunities/{id}", put(api::update_opportunity))
        .route("/opportunities/{id}", delete(api::delete_opportunity))
        // Contractors
        .route("/contractors", get(api::list_contractors))
        .route("/contractors", post(api::create_contractor))
        .route("/contractors/{id}", get(api::get_contractor))
        .route("/contractors/{id}", put(api::update_contractor))
        .route("/contractors/{id}", delete(api::delete_contractor))
        .route(
            "/contractors/{id}/compliance-documents",
            post(api::add_contractor_compliance_document),
        )
        .route(
            "/contractors/{id}/compliance-documents",
            delete(api::remove_contractor_compliance_document),
        )
        // Suppliers
        .route("/suppliers", get(api::list_suppliers))
        .route("/suppliers", post(api::create_supplier))
        .route("/suppliers/{id}", get(api::get_supplier))
        .route("/suppliers/{id}", put(api::update_supplier))
        .route("/suppliers/{id}", delete(api::delete_supplier))
        .route(
            "/suppliers/{id}/compliance-documents",
            post(api::add_supplier_compliance_document),
        )
        .route(
            "/suppliers/{id}/compliance-documents",
            delete(api::remove_supplier_compliance_document),
        )
        // Employees
        .route("/employees", get(api::list_employees))
        .route("/employees", post(api::create_employee))
        .route("/employees/{id}", get(api::get_employee))
        .route("/employees/{id}", put(api::update_employee))
        .route("/employees/{id}", delete(api::delete_employee))
        // Leaves
        .route("/leaves", get(api::list_leaves))
        .route("/leaves", post(api::create_leave))
        .route("/leaves/{id}", get(api::get_leave))
        .route("/leaves/{id}", delete(api::delete_leave))
        .route("/leaves/{id}/status", patch(api::update_leave_status))
        // Teams
        .route("/teams", get(api::list_teams))
        .route("/teams", post(api::create_team))
        .route("/teams/{id}", get(api::get_team))
        .route("/teams/{id}", put(api::update_team))
        .route("/teams/{id}", delete(api::delete_team))
        // Users (provisioned via webhook; no create route)
        .route("/users", get(api::list_users))
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}", put(api::update_user))
        .route("/users/{id}", delete(api::delete_user))
        .route("/users/clerk/{clerkId}", get(api::get_user_by_clerk_id))
        // Search
        .route("/search", get(api::search))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Webhook routes authenticate by signature, not PSK: the auth provider
    // signs each delivery but never holds our API key.
    let webhook_routes = Router::new().route("/api/webhooks/auth", post(api::auth_webhook));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(webhook_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
