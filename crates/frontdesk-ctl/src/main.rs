//! frontdesk-ctl - command-line front end for frontdeskd
//!
//! Each invocation connects to the service, sends one command and prints the
//! result. `watch` stays connected and prints overdue alerts as they arrive.

mod board;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use frontdesk_api::{Command, DeliveryRequest, DeskSnapshot, ResponsePayload, ResponseResult};
use frontdesk_ipc::{IpcClient, IpcError};
use frontdesk_util::{default_socket_path, minutes_until};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "frontdesk-ctl", version, about = "Reception board client for frontdeskd")]
struct Cli {
    /// Socket path (or set FRONTDESK_SOCKET env var)
    #[arg(short, long, env = "FRONTDESK_SOCKET", default_value_os_t = default_socket_path())]
    socket: PathBuf,

    /// Print raw JSON responses
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the board
    State,
    /// Toggle selection of a staff member or delivery
    Select {
        #[command(subcommand)]
        target: SelectTarget,
    },
    /// Clear the selection
    Clear,
    /// Check the selected staff member out
    Out {
        /// Minutes until they are expected back
        #[arg(required_unless_present = "until", conflicts_with = "until")]
        minutes: Option<i64>,
        /// Expected return as HH:MM today
        #[arg(long)]
        until: Option<String>,
    },
    /// Check the selected staff member back in
    In,
    /// Schedule a delivery run
    Schedule {
        /// car or motorcycle
        vehicle: String,
        first_name: String,
        last_name: String,
        phone: String,
        address: String,
        /// Minutes until the driver is expected back
        minutes: i64,
    },
    /// Remove the selected delivery
    Remove,
    /// Reload the roster from the service's config file
    Reload,
    /// Print overdue alerts as they happen
    Watch,
    /// Check that the service is up
    Ping,
}

#[derive(Subcommand, Debug)]
enum SelectTarget {
    /// Row number or staff id
    Staff { target: String },
    /// Row number or delivery id
    Delivery { target: String },
}

async fn fetch_snapshot(client: &mut IpcClient) -> Result<DeskSnapshot> {
    match client.call(Command::GetState).await? {
        ResponsePayload::State(snapshot) => Ok(snapshot),
        other => bail!("unexpected response to GetState: {:?}", other),
    }
}

async fn watch(client: IpcClient) -> Result<()> {
    let mut events = client.subscribe().await.context("Failed to subscribe")?;
    loop {
        match events.next().await {
            Ok(event) => {
                if let Some(line) = board::render_event(&event) {
                    println!("{}", line);
                }
            }
            Err(IpcError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_payload(payload: &ResponsePayload) {
    match payload {
        ResponsePayload::State(snapshot) => print!("{}", board::render_snapshot(snapshot)),
        ResponsePayload::Selection { selection: Some(target) } => println!("Selected {}", target),
        ResponsePayload::Selection { selection: None } => println!("Selection cleared"),
        ResponsePayload::CheckedOut {
            expected_return_display,
            ..
        } => println!("Checked out, expected back at {}", expected_return_display),
        ResponsePayload::CheckedIn { .. } => println!("Checked in"),
        ResponsePayload::DeliveryScheduled(view) => println!(
            "{} {} {} scheduled, expected back at {}",
            view.vehicle.icon(),
            view.first_name,
            view.last_name,
            view.expected_return_display
        ),
        ResponsePayload::DeliveryRemoved { .. } => println!("Delivery removed"),
        ResponsePayload::RosterReloaded { staff_count } => {
            println!("Roster reloaded: {} staff", staff_count)
        }
        ResponsePayload::Subscribed { .. } | ResponsePayload::Unsubscribed => {}
        ResponsePayload::Pong => println!("pong"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut client = IpcClient::connect(&cli.socket)
        .await
        .with_context(|| format!("Failed to connect to frontdeskd at {:?}", cli.socket))?;
    debug!(socket = %cli.socket.display(), "Connected");

    let command = match cli.command {
        Commands::Watch => return watch(client).await,
        Commands::State => Command::GetState,
        Commands::Select { target } => {
            let snapshot = fetch_snapshot(&mut client).await?;
            let target = match target {
                SelectTarget::Staff { target } => board::staff_target(&snapshot, &target)?,
                SelectTarget::Delivery { target } => board::delivery_target(&snapshot, &target)?,
            };
            Command::Select { target }
        }
        Commands::Clear => Command::ClearSelection,
        Commands::Out { minutes, until } => {
            let duration_minutes = match (minutes, until) {
                (Some(minutes), _) => minutes,
                (None, Some(clock)) => {
                    let minutes = minutes_until(&clock, &frontdesk_util::now())
                        .with_context(|| format!("Invalid --until value '{}'", clock))?;
                    i64::from(minutes)
                }
                (None, None) => bail!("give a duration in minutes or --until HH:MM"),
            };
            Command::CheckOut { duration_minutes }
        }
        Commands::In => Command::CheckIn,
        Commands::Schedule {
            vehicle,
            first_name,
            last_name,
            phone,
            address,
            minutes,
        } => Command::ScheduleDelivery(DeliveryRequest {
            vehicle,
            first_name,
            last_name,
            phone,
            address,
            duration_minutes: minutes,
        }),
        Commands::Remove => Command::RemoveSelectedDelivery,
        Commands::Reload => Command::ReloadRoster,
        Commands::Ping => Command::Ping,
    };

    let response = client.send(command).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    match response.result {
        ResponseResult::Ok(payload) => {
            if !cli.json {
                print_payload(&payload);
            }
            Ok(())
        }
        ResponseResult::Err(e) => match e.field {
            Some(field) => bail!("{:?} ({}): {}", e.code, field, e.message),
            None => bail!("{:?}: {}", e.code, e.message),
        },
    }
}
