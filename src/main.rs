use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use routeslips::{
    CircuitCatalog, Config, RouteSession, SqliteStore, StatusStore,
    config::DEFAULT_CONFIG_FILE,
    core::{
        load_circuits,
        product::product_badges,
        stairway::{format_stairway_report, group_by_stairway},
        status::{format_timestamp, now_local, run_daily_reset},
    },
};

#[derive(Parser)]
#[command(name = "routeslips")]
#[command(about = "Newspaper carrier route sheets and delivery tracking")]
struct Cli {
    /// Settings file (defaults to ./routeslips.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with one <code>.txt file per circuit
    #[arg(long, value_name = "DIR", env = "ROUTESLIPS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// SQLite file for delivery and route state
    #[arg(long, value_name = "FILE", env = "ROUTESLIPS_STATE_DB")]
    state_db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available circuits
    Circuits,
    /// Show the product cover sheet of a circuit
    Cover { code: String },
    /// List the stops of a circuit with their delivery state
    List {
        code: String,
        /// Hide stops with STF products
        #[arg(long)]
        hide_stf: bool,
    },
    /// Print the stops grouped by building and stairway
    Stairways { code: String },
    /// Mark a stop (as numbered in `list`) delivered
    Deliver {
        code: String,
        stop: usize,
        /// Clear the delivered mark instead
        #[arg(long)]
        undo: bool,
    },
    /// Start a route now
    Start { code: String },
    /// End a route now
    End { code: String },
    /// Show route status and duration
    Status { code: String },
    /// Put a route back to not started and clear its delivered marks
    Reset { code: String },
    /// Keep running and apply the daily reset at midnight
    Watch,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "routeslips=debug" } else { "routeslips=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path, true)?,
        None => Config::load(DEFAULT_CONFIG_FILE, false)?,
    };
    let data_dir = args.data_dir.unwrap_or(config.data_dir);
    let state_db = args.state_db.unwrap_or(config.state_db);

    let store = StatusStore::new(SqliteStore::open(&state_db).await?);
    info!("Using state database {:?}", store.backend().db_file());
    store.check_and_apply_daily_reset(now_local().date()).await?;

    let catalog = CircuitCatalog::discover(&data_dir)
        .await?
        .with_display_names(config.circuit_names);
    let circuits = load_circuits(&catalog).await;
    info!(
        "Loaded {} of {} circuits from {:?}",
        circuits.len(),
        catalog.codes().len(),
        catalog.data_dir()
    );

    let mut session = RouteSession::new(circuits, store);
    session.hide_stf = config.hide_stf;

    run(&mut session, args.command).await?;

    session.into_store().into_backend().close().await
}

async fn run(session: &mut RouteSession<SqliteStore>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Circuits => {
            for circuit in session.circuits() {
                let status = session.store().get_circuit_status(&circuit.code).await?;
                println!(
                    "{:8} {:30} {:4} stops  {}",
                    circuit.code,
                    circuit.title(),
                    circuit.len(),
                    status.status
                );
            }
        }
        Command::Cover { code } => {
            let circuit = session.select(&code.to_uppercase())?;
            println!("=== {} ===", circuit.title());
            println!("Stops: {}", circuit.len());
            for (tag, count) in session.cover_sheet().unwrap_or_default() {
                println!("  {:10} {:>4}", tag, count);
            }
        }
        Command::List { code, hide_stf } => {
            let code = code.to_uppercase();
            session.hide_stf |= hide_stf;
            let circuit = session.select(&code)?;
            let len = circuit.len();
            let title = circuit.title().to_string();
            let delivered = session.store().delivered_count(&code, len).await?;
            println!("=== {} ({}/{} delivered) ===", title, delivered, len);

            for (index, stop) in session.visible_stops() {
                let mark = if session.store().get_delivery_state(&code, index).await? {
                    "[x]"
                } else {
                    "[ ]"
                };
                let badges: Vec<String> = product_badges(&stop.product)
                    .into_iter()
                    .map(|badge| match badge.tag {
                        Some(tag) if tag != badge.label => format!("{} ({})", badge.label, tag),
                        _ => badge.label,
                    })
                    .collect();
                println!(
                    "{} {:>3}. {:30} {:25} {}",
                    mark,
                    index + 1,
                    stop.address(),
                    stop.name,
                    badges.join(" ")
                );
            }
        }
        Command::Stairways { code } => {
            let circuit = session.select(&code.to_uppercase())?;
            let buildings = group_by_stairway(&circuit.subscribers);
            println!("{}", format_stairway_report(circuit.title(), &buildings));
        }
        Command::Deliver { code, stop, undo } => {
            session.select(&code.to_uppercase())?;
            let Some(index) = stop.checked_sub(1) else {
                anyhow::bail!("Stops are numbered from 1");
            };
            session.set_delivered(index, !undo).await?;
            println!(
                "Stop {} {}",
                stop,
                if undo { "marked not delivered" } else { "marked delivered" }
            );
        }
        Command::Start { code } => {
            session.select(&code.to_uppercase())?;
            let now = format_timestamp(now_local())?;
            if let Some(status) = session.start_route(&now).await? {
                println!(
                    "Route {} started at {}",
                    code.to_uppercase(),
                    status.start_time.unwrap_or_default()
                );
            }
        }
        Command::End { code } => {
            session.select(&code.to_uppercase())?;
            let now = format_timestamp(now_local())?;
            if let Some(status) = session.end_route(&now).await? {
                println!(
                    "Route {} completed in {}",
                    code.to_uppercase(),
                    status.duration().unwrap_or_else(|| "unknown time".to_string())
                );
            }
        }
        Command::Status { code } => {
            session.select(&code.to_uppercase())?;
            if let Some(status) = session.selected_status().await? {
                println!("Status:   {}", status.status);
                println!("Started:  {}", status.start_time.as_deref().unwrap_or("-"));
                println!("Ended:    {}", status.end_time.as_deref().unwrap_or("-"));
                if let Some(duration) = status.duration() {
                    println!("Duration: {}", duration);
                }
            }
        }
        Command::Reset { code } => {
            let code = code.to_uppercase();
            session.select(&code)?;
            session.store().reset_route(&code).await?;
            println!("Route {} reset", code);
        }
        Command::Watch => {
            info!("Watching for daily reset, press Ctrl-C to stop");
            tokio::select! {
                _ = run_daily_reset(session.store(), now_local) => {}
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                }
            }
        }
    }
    Ok(())
}
