use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hn_analysis::{Dispatcher, ExecutionMode};
use hn_app::{
    AppConfig, AppError, AppInstance, AppResult, SimulationSession, build_model,
    format_timestep_time, import_results, load_network, review_orphans, review_subnetworks,
    sweep_stale_sessions,
};
use hn_results::{ResultsAssetKind, ResultsSource, TimestepResults};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "Hydronet CLI - hydraulic network review and results browsing", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Network review checks
    #[command(subcommand)]
    Review(ReviewCommands),
    /// Manage private app storage
    #[command(subcommand)]
    Storage(StorageCommands),
    /// Browse simulation results
    #[command(subcommand)]
    Results(ResultsCommands),
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// List assets that are not connected to the network
    Orphans {
        /// Path to the network YAML file
        network_path: PathBuf,
        /// Run on the calling thread instead of a worker
        #[arg(long)]
        inline: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List disconnected parts of the network
    Subnetworks {
        /// Path to the network YAML file
        network_path: PathBuf,
        /// Run on the calling thread instead of a worker
        #[arg(long)]
        inline: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StorageCommands {
    /// Remove sessions whose heartbeat is stale
    Gc,
    /// Remove one session's entries
    Clear {
        app_id: String,
    },
    /// Copy solver output into a new session
    Import {
        /// Binary results file
        results_out: PathBuf,
        /// Tank volumes side file
        #[arg(long)]
        tank_volumes: Option<PathBuf>,
        /// Pump status side file
        #[arg(long)]
        pump_status: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ResultsCommands {
    /// Show one reporting period of an imported simulation
    Show {
        app_id: String,
        /// Reporting period index
        #[arg(short, long, default_value_t = 0)]
        timestep: usize,
        /// Asset labels to show (all when omitted)
        #[arg(short, long)]
        asset: Vec<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Commands::Review(ReviewCommands::Orphans {
            network_path,
            inline,
            json,
        }) => cmd_review_orphans(&config, &network_path, inline, json),
        Commands::Review(ReviewCommands::Subnetworks {
            network_path,
            inline,
            json,
        }) => cmd_review_subnetworks(&config, &network_path, inline, json),
        Commands::Storage(StorageCommands::Gc) => cmd_storage_gc(&config),
        Commands::Storage(StorageCommands::Clear { app_id }) => cmd_storage_clear(&config, &app_id),
        Commands::Storage(StorageCommands::Import {
            results_out,
            tank_volumes,
            pump_status,
        }) => cmd_storage_import(
            &config,
            &results_out,
            tank_volumes.as_deref(),
            pump_status.as_deref(),
        ),
        Commands::Results(ResultsCommands::Show {
            app_id,
            timestep,
            asset,
            json,
        }) => cmd_results_show(&config, &app_id, timestep, &asset, json),
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = match &config.log_filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::InvalidInput(format!("cannot serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn cmd_review_orphans(
    config: &AppConfig,
    network_path: &Path,
    inline: bool,
    json: bool,
) -> AppResult<()> {
    let network = load_network(network_path)?;
    let model = build_model(&network)?;
    let mut options = config.dispatch_options();
    if inline {
        options.mode = ExecutionMode::Inline;
    }

    let orphans = review_orphans(&model, &Dispatcher::detect(), &options, None)?;

    if json {
        return print_json(&orphans);
    }
    if orphans.is_empty() {
        println!("✓ No orphan assets");
    } else {
        println!("Orphan assets ({}):", orphans.len());
        for orphan in &orphans {
            println!(
                "  {:<10} {:<20} (id {})",
                orphan.asset_type.as_str(),
                orphan.label,
                orphan.asset_id
            );
        }
    }
    Ok(())
}

fn cmd_review_subnetworks(
    config: &AppConfig,
    network_path: &Path,
    inline: bool,
    json: bool,
) -> AppResult<()> {
    let network = load_network(network_path)?;
    let model = build_model(&network)?;
    let mut options = config.dispatch_options();
    if inline {
        options.mode = ExecutionMode::Inline;
    }

    let subnetworks = review_subnetworks(&model, &Dispatcher::detect(), &options, None)?;

    if json {
        return print_json(&subnetworks);
    }
    if subnetworks.len() <= 1 {
        println!("✓ Network is fully connected");
        return Ok(());
    }
    println!("Subnetworks ({}):", subnetworks.len());
    for sub in &subnetworks {
        let supply = if sub.has_supply() { "" } else { "  no supply source" };
        println!(
            "  #{:<4} {:>5} nodes {:>5} links {:>5} pipes{}",
            sub.subnetwork_id,
            sub.node_labels.len(),
            sub.link_labels.len(),
            sub.pipe_count,
            supply
        );
    }
    Ok(())
}

fn cmd_storage_gc(config: &AppConfig) -> AppResult<()> {
    let report = sweep_stale_sessions(config)?;
    println!(
        "✓ Removed {} stale session(s), kept {}",
        report.removed.len(),
        report.kept.len()
    );
    for app_id in &report.removed {
        println!("  - {}", app_id);
    }
    Ok(())
}

fn cmd_storage_clear(config: &AppConfig, app_id: &str) -> AppResult<()> {
    AppInstance::attach(config, app_id)?.clear()?;
    println!("✓ Cleared session {}", app_id);
    Ok(())
}

fn cmd_storage_import(
    config: &AppConfig,
    results_out: &Path,
    tank_volumes: Option<&Path>,
    pump_status: Option<&Path>,
) -> AppResult<()> {
    let instance = AppInstance::start(config)?;
    import_results(instance.storage(), results_out, tank_volumes, pump_status)?;
    let session = SimulationSession::open(instance.storage(), None)?;
    println!("✓ Imported into session {}", instance.app_id());
    println!("  Reporting periods: {}", session.timestep_count());
    Ok(())
}

#[derive(Serialize)]
struct AssetReport {
    label: String,
    #[serde(flatten)]
    values: AssetValues,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AssetValues {
    Junction(hn_results::JunctionResults),
    Tank(hn_results::TankResults),
    Pipe(hn_results::PipeResults),
    Valve(hn_results::ValveResults),
    Pump(hn_results::PumpResults),
}

fn describe(results: &TimestepResults, label: &str) -> Option<AssetValues> {
    match results.asset_kind(label)? {
        ResultsAssetKind::Junction => results.junction(label).map(AssetValues::Junction),
        ResultsAssetKind::Tank => results.tank(label).map(AssetValues::Tank),
        ResultsAssetKind::Pipe => results.pipe(label).map(AssetValues::Pipe),
        ResultsAssetKind::Valve => results.valve(label).map(AssetValues::Valve),
        ResultsAssetKind::Pump => results.pump(label).map(AssetValues::Pump),
    }
}

fn cmd_results_show(
    config: &AppConfig,
    app_id: &str,
    timestep: usize,
    assets: &[String],
    json: bool,
) -> AppResult<()> {
    let instance = AppInstance::attach(config, app_id)?;
    let mut session = SimulationSession::open(instance.storage(), None)?;
    let results = session.go_to(timestep)?;

    let labels: Vec<String> = if assets.is_empty() {
        let ids = results.simulation_ids();
        ids.node_ids.iter().chain(&ids.link_ids).cloned().collect()
    } else {
        assets.to_vec()
    };
    let reports: Vec<AssetReport> = labels
        .into_iter()
        .filter_map(|label| {
            describe(&results, &label).map(|values| AssetReport { label, values })
        })
        .collect();

    if json {
        return print_json(&reports);
    }
    let step = session.reader().metadata().reporting_step;
    println!(
        "Session {} - period {}/{} ({})",
        app_id,
        timestep + 1,
        session.timestep_count(),
        format_timestep_time(timestep, step)
    );
    for report in &reports {
        println!("  {:<20} {}", report.label, summarize(&report.values));
    }
    Ok(())
}

fn summarize(values: &AssetValues) -> String {
    match values {
        AssetValues::Junction(j) => format!(
            "junction  pressure={:.2} head={:.2} demand={:.3}",
            j.pressure, j.head, j.demand
        ),
        AssetValues::Tank(t) => format!(
            "tank      level={:.2} head={:.2} volume={:.2}",
            t.level, t.head, t.volume
        ),
        AssetValues::Pipe(p) => format!(
            "pipe      flow={:.3} velocity={:.3} headloss={:.3} status={:?}",
            p.flow, p.velocity, p.headloss, p.status
        ),
        AssetValues::Valve(v) => format!(
            "valve     flow={:.3} headloss={:.3} status={:?}",
            v.flow, v.headloss, v.status
        ),
        AssetValues::Pump(p) => format!(
            "pump      flow={:.3} headloss={:.3} status={:?}",
            p.flow, p.headloss, p.status
        ),
    }
}
