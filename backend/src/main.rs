use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worklog_backend::{routes, AppState, Config, Dispatcher, SendGridClient, SupabaseClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; a missing required variable aborts here, before
    // any work is attempted.
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Worklog report service");

    // Initialize components
    let store = SupabaseClient::new(&config.supabase_url, &config.supabase_service_role_key);
    let mailer = SendGridClient::new(&config.sendgrid_base_url, &config.sendgrid_api_key);
    let dispatcher = Dispatcher::new(store, mailer, config.sender_email.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        dispatcher,
    });

    // Build CORS layer
    let cors = if config.cors_origins.trim() == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Build router
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::reports::router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
