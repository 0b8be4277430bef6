use axum::{middleware, Router};
use learnflow_csrf::{csrf_protect, CsrfProtection};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod handlers;

use crate::config::{AppConfig, DATA_DIR};

/// Secrets shorter than this still work but are logged as weak
const RECOMMENDED_SECRET_LENGTH: usize = 32;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub csrf: CsrfProtection,
}

impl AppState {
    pub fn new(config: AppConfig, csrf: CsrfProtection) -> Self {
        Self {
            config: Arc::new(config),
            csrf,
        }
    }

    pub fn api_prefix(&self) -> String {
        format!("/{}", self.config.csrf_path_prefix)
    }
}

/// Build the application router with tracing and CSRF protection applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(&state.api_prefix(), handlers::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.csrf.clone(),
                    csrf_protect,
                )),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize file logging

    let file_appender = tracing_appender::rolling::daily(DATA_DIR.join("logs"), "learnflow.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Create an environment filter with configurable log level
    // Defaults to info for the server and the CSRF layer but can be overridden with RUST_LOG
    // Examples:
    //   RUST_LOG=debug                               - Enable debug for all modules
    //   RUST_LOG=learnflow_csrf=debug                - See why CSRF checks fail
    //   RUST_LOG=learnflow_server=trace,tower=info   - Trace this app, info for tower
    let default_filter = "learnflow_server=info,learnflow_csrf=info,tower_http=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    let loaded_config = config::load_config().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });
    info!("Loaded configuration: {:?}", loaded_config);

    let csrf_config = loaded_config.csrf_config().unwrap_or_else(|e| {
        error!(
            "{}; set {}_CSRF_SECRET or csrf_secret in {}",
            e,
            config::ENV_PREFIX,
            config::DEFAULT_CONFIG_FILENAME
        );
        std::process::exit(1);
    });

    if csrf_config.secret.len() < RECOMMENDED_SECRET_LENGTH {
        warn!(
            "CSRF secret is shorter than {} bytes, consider a longer random value",
            RECOMMENDED_SECRET_LENGTH
        );
    }
    if !csrf_config.secure_cookie {
        warn!("Running outside production: CSRF cookie is sent without the Secure attribute");
    }

    let csrf = CsrfProtection::new(csrf_config).unwrap_or_else(|e| {
        error!("Failed to initialize CSRF protection: {}", e);
        std::process::exit(1);
    });

    let app_state = AppState::new(loaded_config.clone(), csrf);
    info!("CSRF protection enabled for {}/*", app_state.api_prefix());
    let app = app(app_state);

    // Create socket address
    let addr = match format!("{}:{}", loaded_config.host, loaded_config.port).parse::<SocketAddr>()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!(
                "Invalid address {}:{}: {}",
                loaded_config.host, loaded_config.port, e
            );
            std::process::exit(1);
        }
    };

    // Start the server
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Starting LearnFlow server on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
