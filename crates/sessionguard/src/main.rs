mod app;
mod handlers;

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use sessionguard_auth::{AuthConfig, AuthState};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::create_app;

/// sessionguard - Session-guarded API backed by WorkOS AuthKit
#[derive(Parser, Debug)]
#[command(name = "sessionguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "5000", env = "PORT")]
    port: u16,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Port for the Mock IdP server
    #[cfg(feature = "mock")]
    #[arg(long, default_value = "3001", env = "MOCK_IDP_PORT")]
    mock_idp_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let state = build_state(&cli)?;
    tracing::info!(
        frontend = %state.config.frontend_url,
        guard_mode = ?state.config.guard_mode,
        refresh_behavior = ?state.config.refresh_behavior,
        "auth configured"
    );

    // Build the application router
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "sessionguard=debug,sessionguard_auth=debug,sessionguard_core=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Auth state backed by WorkOS, configured from the environment.
#[cfg(not(feature = "mock"))]
fn build_state(_cli: &Cli) -> Result<AuthState> {
    let config = AuthConfig::from_env()?;
    Ok(AuthState::workos(config)?)
}

/// Auth state backed by the Mock IdP, which is started in the background.
#[cfg(feature = "mock")]
fn build_state(cli: &Cli) -> Result<AuthState> {
    use sessionguard_auth::mock_idp::MockIdpServer;

    let config = AuthConfig::development(cli.port)?;
    let mock_idp_url = url::Url::parse(&format!("http://localhost:{}", cli.mock_idp_port))?;

    let server = MockIdpServer::new(cli.mock_idp_port);
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "Mock IdP server failed");
        }
    });

    tracing::warn!(url = %mock_idp_url, "using Mock IdP; do not run this build in production");
    Ok(AuthState::mock(config, mock_idp_url))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
