//! CLI for sms-relay
//!
//! Subcommands:
//! - `server`: run the HTTP API, the WebSocket channel and the sweeper
//! - `watch`: connect to the WebSocket channel and print every event

use std::process::ExitCode;

use clap::Parser;
use sms_relay::broker::Broker;
use sms_relay::broker::sweeper::start_sweep_loop;
use sms_relay::config::{Settings, load_config};
use sms_relay::store::MessageStore;
use sms_relay::transport::{AppState, router, shutdown, websocket};
use sms_relay::utils::{Result, logging};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "sms-relay")]
enum Command {
    /// Start the relay
    Server,
    /// Print events from a running relay's WebSocket channel
    Watch {
        /// WebSocket URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:8081")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info", false);
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.log.level, settings.log.json);

    let result = match cmd {
        Command::Server => run_server(settings).await,
        Command::Watch { url } => run_watch(&url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("sms-relay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server(settings: Settings) -> Result<()> {
    let policy = settings.store.retention_policy()?;
    let broker = Broker::new(MessageStore::new(policy)).shared();
    info!(?policy, profile = ?settings.ingest.profile, "message store ready");
    let (trigger, stop) = shutdown::channel();

    if policy.is_ttl() {
        let every = settings.store.sweep_interval()?;
        tokio::spawn(start_sweep_loop(broker.clone(), every));
    }

    if settings.server.ws_enabled {
        let listener = websocket::bind(&settings.server.ws_addr()).await?;
        tokio::spawn(websocket::start_websocket_server(listener, broker.clone(), stop.clone()));
    }

    let app = router(AppState::new(broker, &settings).with_shutdown(stop));
    let listener = tokio::net::TcpListener::bind(settings.server.http_addr()).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            trigger.send_replace(true);
        })
        .await?;

    info!("sms-relay stopped");
    Ok(())
}

async fn run_watch(url: &str) -> Result<()> {
    use futures_util::StreamExt;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;
    info!(%url, "watching");

    while let Some(frame) = ws_stream.next().await {
        match frame? {
            WsMessage::Text(text) => println!("{text}"),
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received. Exiting gracefully.");
}
