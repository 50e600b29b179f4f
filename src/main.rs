//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .expect("Failed to initialise application state.");

    // Bring the schema up to date before accepting traffic
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Failed to run database migrations.");

    tracing::info!("✅ Database migrations applied");

    // Public authentication routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::crm::create_customer).get(handlers::crm::list_customers),
        )
        .route("/{id}", get(handlers::crm::get_customer))
        .route("/{id}/stage", patch(handlers::stages::update_customer_stage))
        .route("/{id}/projects", post(handlers::crm::create_project))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let job_routes = Router::new()
        .route("/", post(handlers::crm::create_job))
        .route("/{id}", get(handlers::crm::get_job))
        .route("/{id}/stage", patch(handlers::stages::update_job_stage))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let form_routes = Router::new()
        .route("/", post(handlers::approvals::submit_form))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let approval_routes = Router::new()
        .route("/pending", get(handlers::approvals::list_pending))
        .route("/approve", post(handlers::approvals::approve_form))
        .route("/reject", post(handlers::approvals::reject_form))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Spreadsheet uploads are bigger than the default JSON body cap
    let import_routes = Router::new()
        .route("/upload", post(handlers::imports::upload_import))
        .route("/{id}/status", get(handlers::imports::get_import_status))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let notification_routes = Router::new()
        .route("/production", get(handlers::notifications::list_production))
        .route(
            "/production/{id}/read",
            patch(handlers::notifications::mark_production_read),
        )
        .route("/approvals", get(handlers::notifications::list_approval))
        .route(
            "/approvals/{id}/read",
            patch(handlers::notifications::toggle_approval_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/jobs", job_routes)
        .nest("/api/forms", form_routes)
        .nest("/api/approvals", approval_routes)
        .nest("/api/import", import_routes)
        .nest("/api/notifications", notification_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("🚀 Server listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Axum server error");
}
