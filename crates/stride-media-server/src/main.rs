use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use stride_api::router::media_router;
use stride_api::state::{AppStateInner, MediaState};
use stride_api::uploads::UploadClient;
use stride_types::token::TokenSigner;

/// Placeholder secrets that MUST NOT reach a running service.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride=debug,tower_http=debug".into()),
        )
        .init();

    // Config — the secret must match the auth server's or no token it
    // issues will verify here.
    let jwt_secret = std::env::var("STRIDE_JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: STRIDE_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       All stride services must share the same secret.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let host = std::env::var("STRIDE_MEDIA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("STRIDE_MEDIA_PORT")
        .unwrap_or_else(|_| "3001".into())
        .parse()?;
    let db_path = std::env::var("STRIDE_DB_PATH").unwrap_or_else(|_| "stride.db".into());
    let upload_url =
        std::env::var("STRIDE_UPLOAD_URL").unwrap_or_else(|_| "http://localhost:3002".into());
    let upload_timeout_secs: u64 = std::env::var("STRIDE_UPLOAD_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    // Init database
    let db = stride_db::Database::open(&PathBuf::from(&db_path))?;

    let state = MediaState {
        app: Arc::new(AppStateInner {
            db,
            signer: TokenSigner::new(&jwt_secret),
        }),
        uploads: UploadClient::new(&upload_url, Duration::from_secs(upload_timeout_secs))?,
    };

    let app = media_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("stride media server listening on {}", addr);
    info!("upload server at {}", upload_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
