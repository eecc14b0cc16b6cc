use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fleet_core::FleetConfig;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "fleetctl",
    about = "Fleet rollout progress — per-phase estimates from deployment snapshots",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to fleet.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the progress breakdown of a deployment.
    ///
    /// Multi-phase deployments, and deployments without update control,
    /// are broken down per phase. Single-phase deployments with update
    /// control are broken down per installation step.
    Progress {
        /// Deployment JSON as returned by the deployments API
        #[arg(short, long)]
        deployment: PathBuf,
        /// Clock reading (RFC 3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,
        /// Output format: text or json (overrides [output].format)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Show the phase schedule of a deployment
    Schedule {
        #[arg(short, long)]
        deployment: PathBuf,
        #[arg(long)]
        now: Option<String>,
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Validate a phase list against a target device count
    Validate {
        /// JSON array of phases
        #[arg(short, long)]
        phases: PathBuf,
        /// Number of devices the deployment targets
        #[arg(short = 'n', long)]
        devices: u64,
    },
    /// Manage fleet.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a fleet.toml scaffold, or write it to --path
    Init {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FleetConfig::from_file(path)?,
        None => FleetConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log.filter.parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Progress { deployment, now, format } => {
            commands::progress::progress(&config, &deployment, now.as_deref(), format.as_deref())
        }
        Commands::Schedule { deployment, now, format } => {
            commands::schedule::schedule(&config, &deployment, now.as_deref(), format.as_deref())
        }
        Commands::Validate { phases, devices } => {
            commands::validate::validate(&phases, devices)
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => commands::config::init(path.as_deref()),
        },
    }
}
