use axum::{
    routing::{get, post},
    Router,
};
use petmeet::{handlers, handlers::AppState, utils, Config, get_db_pool};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::{CorsLayer, Any, AllowOrigin}, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use axum::http::{header, Method, HeaderValue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = petmeet::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    petmeet::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let app = create_router(pool, config);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(pool: PgPool, config: Config) -> Router {
    let cors_layer = create_cors_layer(&config);
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.session_inactivity_minutes,
        )));
    let app_state = AppState::new(pool, config);

    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/api/users/register", post(handlers::register))
        .route("/api/users/login", post(handlers::login))
        .route("/api/users/logout", post(handlers::logout))
        .route("/api/users/me", get(handlers::me))
        .route("/api/pets", get(handlers::list_pets).post(handlers::create_pet))
        .route("/api/pets/{id}", get(handlers::get_pet))
        // Matching rooms
        .route("/api/rooms", get(handlers::list_rooms).post(handlers::create_room))
        .route(
            "/api/rooms/{id}",
            get(handlers::get_room)
                .put(handlers::update_room)
                .delete(handlers::delete_room),
        )
        .route("/api/rooms/{id}/apply", post(handlers::apply_room))
        .route("/api/rooms/{id}/participants", get(handlers::list_participants))
        .route(
            "/api/rooms/{id}/participants/{user_id}/accept",
            post(handlers::accept_participant),
        )
        .route(
            "/api/rooms/{id}/participants/{user_id}/reject",
            post(handlers::reject_participant),
        )
        .route("/api/keywords", get(handlers::top_keywords))
        // Calendar
        .route("/api/rooms/{id}/confirm", post(handlers::confirm_schedule))
        .route("/api/schedules", get(handlers::list_schedules))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(session_layer),
        )
        .with_state(app_state)
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Session cookies need credentialed CORS, which only works with explicit origins
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if !trimmed.is_empty() {
                trimmed.parse().ok()
            } else {
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Default to permissive for development
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

async fn health_check() -> &'static str {
    "OK"
}
