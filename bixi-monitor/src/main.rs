use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use bixi_monitor::config::MonitorConfig;
use bixi_monitor::coordinator::{RefreshCoordinator, SnapshotReader};
use bixi_monitor::inventory::{
    FetchError, FileInventory, InventoryClient, InventorySource, RawInventory,
};
use bixi_monitor::logging::init_logging;
use bixi_monitor::sensor::sensors_for_stations;
use bixi_monitor::station::resolve;
use bixi_monitor::web::{AppState, create_router};

#[derive(Parser)]
#[command(name = "bixi-monitor")]
#[command(about = "Poll BIXI station availability and serve it over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh the configured stations on a timer and serve them
    Serve(ServeArgs),
    /// List every station name upstream with its sensor token
    Stations(StationsArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Station to monitor (repeatable, replaces the configured list)
    #[arg(short, long = "station")]
    stations: Vec<String>,

    /// Minutes between refreshes (5 to 60)
    #[arg(long)]
    interval_mins: Option<u64>,

    /// HTTP listen address
    #[arg(long)]
    listen: Option<String>,

    #[arg(long)]
    inventory_url: Option<String>,

    /// Read the inventory from a local JSON file instead of the API
    #[arg(long, conflicts_with = "inventory_url")]
    inventory_file: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,
}

#[derive(clap::Args)]
struct StationsArgs {
    #[arg(long)]
    inventory_url: Option<String>,

    /// Only list names containing this text (case-insensitive)
    #[arg(short, long)]
    filter: Option<String>,
}

/// Where the coordinator gets its inventory.
enum Inventory {
    Http(InventoryClient),
    File(FileInventory),
}

impl InventorySource for Inventory {
    async fn fetch_inventory(&self) -> Result<RawInventory, FetchError> {
        match self {
            Inventory::Http(client) => client.fetch_inventory().await,
            Inventory::File(file) => file.fetch_inventory().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Stations(args) => list_stations(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };
    if !args.stations.is_empty() {
        config = config.with_stations(args.stations);
    }
    if let Some(mins) = args.interval_mins {
        config = config.with_scan_interval_mins(mins);
    }
    if let Some(listen) = args.listen {
        config = config.with_listen(listen);
    }
    if let Some(url) = args.inventory_url {
        config = config.with_inventory_url(url);
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    init_logging(&config.log_level).context("failed to install logger")?;
    config.validate().context("invalid configuration")?;
    let addr = config.listen_addr()?;

    let source = match args.inventory_file {
        Some(path) => {
            info!(path = %path.display(), "reading inventory from file");
            Inventory::File(FileInventory::new(path))
        }
        None => Inventory::Http(
            InventoryClient::new(config.inventory()).context("failed to create inventory client")?,
        ),
    };

    let stations = config.station_list();
    let sensors = sensors_for_stations(&stations);
    let coordinator = RefreshCoordinator::new(source, config.fetch_timeout());

    // Fail fast if the inventory is unreachable at startup.
    coordinator
        .start(config.scan_interval(), config.station_set())
        .await
        .context("initial station refresh failed")?;

    let snapshot = coordinator.snapshot();
    for station in &stations {
        if !snapshot.contains(station) {
            error!(station = %station, "station not found in inventory");
        }
    }

    tokio::spawn(watch_availability(coordinator.reader()));

    let app = create_router(AppState::new(coordinator.reader(), sensors));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("BIXI monitor listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    coordinator.shutdown().await;
    Ok(())
}

/// Log when the inventory becomes unavailable and when it comes back.
async fn watch_availability(mut reader: SnapshotReader) {
    let mut available = true;
    while reader.changed().await {
        match (available, reader.last_error()) {
            (true, Some(failure)) => {
                error!(kind = %failure.kind, "inventory unavailable: {}", failure.message);
                available = false;
            }
            (false, None) => {
                info!("inventory available again");
                available = true;
            }
            _ => {}
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn list_stations(args: StationsArgs) -> Result<()> {
    init_logging("warn").context("failed to install logger")?;

    let mut config = MonitorConfig::default().inventory();
    if let Some(url) = args.inventory_url {
        config = config.with_url(url);
    }
    let client = InventoryClient::new(config)?;

    let mut names = client.fetch_station_names().await?;
    names.sort();
    names.dedup();

    let filter = args.filter.map(|f| f.to_lowercase());
    for name in names {
        if filter.as_ref().is_none_or(|f| name.to_lowercase().contains(f.as_str())) {
            println!("{:<12} {name}", resolve(&name));
        }
    }
    Ok(())
}
