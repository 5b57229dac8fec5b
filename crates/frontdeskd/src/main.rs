//! frontdeskd - The reception board service
//!
//! This is the main entry point for the frontdeskd service.
//! It wires together all the components:
//! - Configuration loading and roster seeding
//! - The `FrontDesk` board state
//! - The periodic overdue scan
//! - IPC server and alert broadcast

mod dispatch;

use anyhow::{Context, Result};
use clap::Parser;
use frontdesk_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, Response, ResponsePayload, API_VERSION,
};
use frontdesk_config::load_config;
use frontdesk_core::{AlertSink, FrontDesk, OverdueAlert, OverdueScheduler};
use frontdesk_ipc::{IpcServer, ServerMessage};
use frontdesk_util::{default_config_path, is_mock_time_active, ClientId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// frontdeskd - Reception board service
#[derive(Parser, Debug)]
#[command(name = "frontdeskd")]
#[command(
    about = "Tracks staff presence and deliveries, alerting when someone is overdue",
    long_about = None
)]
struct Args {
    /// Configuration file path (default: ~/.config/frontdesk/config.toml)
    #[arg(short, long, env = "FRONTDESK_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set FRONTDESK_SOCKET env var)
    #[arg(short, long, env = "FRONTDESK_SOCKET")]
    socket: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// Alert sink that logs each alert and pushes it to subscribers
struct BroadcastSink {
    ipc: Arc<IpcServer>,
}

impl AlertSink for BroadcastSink {
    fn deliver(&self, alert: &OverdueAlert) {
        info!(message = %alert.message(), "Broadcasting overdue alert");
        self.ipc
            .broadcast_event(Event::new(EventPayload::from(alert.clone())));
    }
}

/// Main service state
struct Service {
    desk: FrontDesk,
    scheduler: OverdueScheduler,
    config_path: PathBuf,
    ipc: Arc<IpcServer>,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            staff_count = config.roster.len(),
            "Configuration loaded"
        );

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| config.service.socket_path.clone());

        let mut desk = FrontDesk::new();
        desk.seed_roster(config.roster);

        let scheduler = OverdueScheduler::new(config.service.tick_interval);

        let mut ipc = IpcServer::new(&socket_path);
        ipc.bind()
            .await
            .with_context(|| format!("Failed to bind socket {:?}", socket_path))?;

        Ok(Self {
            desk,
            scheduler,
            config_path: args.config.clone(),
            ipc: Arc::new(ipc),
        })
    }

    async fn run(self) -> Result<()> {
        let ipc = self.ipc.clone();
        let mut ipc_messages = ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        let desk = Arc::new(Mutex::new(self.desk));
        let scheduler = self.scheduler;
        let config_path = self.config_path;
        let sink = BroadcastSink { ipc: ipc.clone() };

        let ipc_accept = ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let mut tick_timer = tokio::time::interval(scheduler.period());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_interval_secs = scheduler.period().as_secs(),
            "Service running"
        );

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                // Overdue scan. The lock is held for the whole scan so it
                // sees one consistent board.
                _ = tick_timer.tick() => {
                    let now = frontdesk_util::now();
                    let mut desk = desk.lock().await;

                    if scheduler.fire(&mut desk, now, &sink) > 0 {
                        let snapshot = desk.snapshot(now);
                        ipc.broadcast_event(Event::new(EventPayload::StateChanged(snapshot)));
                    }
                }

                Some(msg) = ipc_messages.recv() => {
                    Self::handle_ipc_message(&desk, &ipc, &config_path, msg).await;
                }
            }
        }

        info!("Shutting down frontdeskd");
        ipc.broadcast_event(Event::new(EventPayload::Shutdown));
        // Let writer tasks flush the shutdown event.
        tokio::task::yield_now().await;
        ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }

    async fn handle_ipc_message(
        desk: &Arc<Mutex<FrontDesk>>,
        ipc: &Arc<IpcServer>,
        config_path: &Path,
        msg: ServerMessage,
    ) {
        match msg {
            ServerMessage::Request { client_id, request } => {
                let response = if request.api_version != API_VERSION {
                    Response::error(
                        request.request_id,
                        ErrorInfo::new(
                            ErrorCode::InvalidRequest,
                            format!(
                                "API version {} not supported (expected {})",
                                request.api_version, API_VERSION
                            ),
                        ),
                    )
                } else {
                    Self::handle_command(
                        desk,
                        ipc,
                        config_path,
                        &client_id,
                        request.request_id,
                        request.command,
                    )
                    .await
                };

                if let Err(e) = ipc.send_response(&client_id, response).await {
                    debug!(client_id = %client_id, error = %e, "Failed to queue response");
                }
            }

            ServerMessage::ClientConnected { client_id, info } => {
                info!(
                    client_id = %client_id,
                    role = ?info.role,
                    uid = ?info.uid,
                    "Client connected"
                );
            }

            ServerMessage::ClientDisconnected { client_id } => {
                debug!(client_id = %client_id, "Client disconnected");
            }
        }
    }

    async fn handle_command(
        desk: &Arc<Mutex<FrontDesk>>,
        ipc: &Arc<IpcServer>,
        config_path: &Path,
        client_id: &ClientId,
        request_id: u64,
        command: Command,
    ) -> Response {
        let Some(client) = ipc.client_info(client_id).await else {
            return Response::error(
                request_id,
                ErrorInfo::new(ErrorCode::InvalidRequest, "Unknown client"),
            );
        };

        if let Err(e) = dispatch::authorize(client.role, &command) {
            warn!(
                client_id = %client_id,
                role = ?client.role,
                command = ?command,
                "Command denied"
            );
            return Response::error(request_id, e);
        }

        match command {
            Command::SubscribeEvents => {
                ipc.set_subscribed(client_id, true).await;
                Response::success(
                    request_id,
                    ResponsePayload::Subscribed {
                        client_id: client_id.clone(),
                    },
                )
            }

            Command::UnsubscribeEvents => {
                ipc.set_subscribed(client_id, false).await;
                Response::success(request_id, ResponsePayload::Unsubscribed)
            }

            Command::Ping => Response::success(request_id, ResponsePayload::Pong),

            command => {
                let now = frontdesk_util::now();
                let mut desk = desk.lock().await;

                match dispatch::apply(&mut desk, config_path, command, now) {
                    Ok(applied) => {
                        if applied.changed {
                            ipc.broadcast_event(Event::new(EventPayload::StateChanged(
                                desk.snapshot(now),
                            )));
                        }
                        Response::success(request_id, applied.payload)
                    }
                    Err(e) => {
                        debug!(
                            client_id = %client_id,
                            code = ?e.code,
                            message = %e.message,
                            "Command failed"
                        );
                        Response::error(request_id, e)
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "frontdeskd starting");

    if is_mock_time_active() {
        warn!("Mock time is active; overdue checks use the shifted clock");
    }

    let service = Service::new(&args).await?;
    service.run().await
}
