use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use creatorify_api::background::uploader::{UploadQueue, Uploader};
use creatorify_api::config::ServerConfig;
use creatorify_api::router::build_app_router;
use creatorify_api::state::AppState;
use creatorify_cloud::media::{CloudinaryStore, MediaStore};
use creatorify_cloud::platform::{GpuPlatform, HttpGpuPlatform};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "creatorify_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; protected routes will return 500");
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = creatorify_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    creatorify_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    creatorify_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Remote services ---
    let platform: Arc<dyn GpuPlatform> = Arc::new(
        HttpGpuPlatform::new(config.platform.clone()).expect("Failed to build GPU platform client"),
    );
    tracing::info!(base_url = %config.platform.base_url, app = %config.platform.app_name, "GPU platform client ready");

    let media: Option<Arc<dyn MediaStore>> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            tracing::info!(cloud_name = %cloudinary.cloud_name, "Media store enabled");
            Some(Arc::new(
                CloudinaryStore::new(cloudinary).expect("Failed to build media store client"),
            ))
        }
        None => {
            tracing::warn!("Cloudinary credentials missing; media store disabled");
            None
        }
    };

    // --- Background uploader ---
    let (uploads, upload_rx) = UploadQueue::new(config.upload_queue_capacity);
    let uploader = Uploader {
        pool: pool.clone(),
        platform: Arc::clone(&platform),
        media: media.clone(),
    };
    let upload_cancel = CancellationToken::new();
    let upload_handle = tokio::spawn(uploader.run(upload_rx, upload_cancel.clone()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        platform,
        media,
        uploads,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    upload_cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(30), upload_handle)
        .await
        .is_err()
    {
        tracing::warn!("Upload worker did not drain in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
