use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use menu_api::config::{self, SecurityConfig};
use menu_api::database::manager::DatabaseManager;
use menu_api::handlers::{auth, categories, customization, items};
use menu_api::middleware::auth::admin_auth_middleware;
use menu_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting menu API in {:?} mode", config.environment);

    let state = AppState::new();
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("MENU_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Menu API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        // Public menu reads
        .merge(menu_read_routes())
        // Admin-only mutations behind the session cookie
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(cors_layer(&config::config().security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors || security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn menu_read_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::list))
        .route("/categories/:category_id/items", get(items::list))
        .route("/customizations", get(customization::list))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Session management
        .route("/auth/logout", post(auth::logout))
        .route("/auth/whoami", get(auth::whoami))
        // Category CRUD and reorder
        .route("/categories", post(categories::create))
        .route("/categories/reorder", put(categories::reorder))
        .route(
            "/categories/:category_id",
            put(categories::update).delete(categories::delete),
        )
        // Item CRUD and per-category reorder
        .route("/categories/:category_id/items", post(items::create))
        .route("/categories/:category_id/items/reorder", put(items::reorder))
        .route("/items/:item_id", put(items::update).delete(items::delete))
        // Customization tree replace/delete
        .route(
            "/categories/:category_id/customization",
            put(customization::save).delete(customization::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Menu API",
        "version": version,
        "description": "Restaurant menu CMS backend (Axum + Postgres)",
        "endpoints": {
            "health": "/health (public)",
            "login": "/auth/login (public)",
            "categories": "/categories[/:id] (reads public, writes admin)",
            "reorder": "/categories/reorder, /categories/:id/items/reorder (admin)",
            "items": "/categories/:id/items, /items/:id (reads public, writes admin)",
            "customizations": "/customizations, /categories/:id/customization",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
