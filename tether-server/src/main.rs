mod api;
mod config;
mod db;
mod session;
mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use state::AppState;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = config::Settings::new().expect("Failed to load settings");

    // Initialize database
    let db = db::Database::new(&settings.database.path).expect("Failed to create database");

    db.initialize()
        .expect("Failed to initialize database schema");

    // Always seed test data for development
    db.seed_test_data().expect("Failed to seed test data");
    tracing::info!("Test data seeded successfully");

    tracing::info!("Database initialized successfully");

    // Create application state
    let state = AppState::new(db);

    // Run initial session cleanup on startup
    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) => {
            if count > 0 {
                tracing::info!("Cleaned up {} expired sessions on startup", count);
            }
        }
        Err(e) => {
            tracing::error!("Failed to cleanup expired sessions on startup: {}", e);
        }
    }

    // Start background task for periodic session cleanup
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600)); // Run every hour
        loop {
            interval.tick().await;
            match cleanup_state.session_manager.cleanup_expired_sessions() {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!("Periodic cleanup: removed {} expired sessions", count);
                    }
                }
                Err(e) => {
                    tracing::error!("Periodic session cleanup failed: {}", e);
                }
            }
        }
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication routes
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        // User routes
        .route("/users/search", get(api::users::search_users))
        .route("/users/me", get(api::users::get_me))
        .route("/users/me", put(api::users::update_profile))
        .route("/users/:id", get(api::users::get_profile))
        .route("/users/:id/posts", get(api::posts::list_user_posts))
        .route("/users/:id/experience", get(api::profile::list_experience))
        .route("/users/:id/education", get(api::profile::list_education))
        .route("/users/:id/skills", get(api::profile::list_skills))
        // Profile collection routes
        .route("/profile/experience", post(api::profile::add_experience))
        .route("/profile/education", post(api::profile::add_education))
        .route("/profile/skills", post(api::profile::add_skill))
        // Connection routes
        .route("/connections", post(api::connections::create_request))
        .route("/connections", get(api::connections::list_connections))
        .route("/connections/pending", get(api::connections::list_pending))
        .route("/connections/:id/respond", post(api::connections::respond))
        // Post routes
        .route("/posts", post(api::posts::create_post))
        .route("/posts/:id", get(api::posts::get_post))
        .route("/posts/:id", delete(api::posts::delete_post))
        .route("/posts/:id/like", post(api::posts::toggle_like))
        .route("/posts/:id/comments", post(api::posts::create_comment))
        .route("/posts/:id/comments", get(api::posts::list_comments))
        // Feed
        .route("/feed", get(api::feed::get_feed))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

async fn health_check() -> &'static str {
    "OK"
}
