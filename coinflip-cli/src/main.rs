mod commands;
mod config;

use clap::{Parser, Subcommand};
use coinflip_engine::EngineError;
use config::ConfigOverrides;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coinflip")]
#[command(about = "Timed coin-flip betting rounds")]
#[command(version)]
struct Cli {
    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the round duration in seconds
    #[arg(long, global = true)]
    round_duration_secs: Option<u64>,

    /// Override the buy-in amount
    #[arg(long, global = true)]
    buy_in: Option<f64>,

    /// Override the rake (0.05 = 5%)
    #[arg(long, global = true)]
    rake: Option<f64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play rounds interactively against bots
    Play {
        /// Number of bots joining each round
        #[arg(short, long, default_value_t = 3)]
        bots: usize,
    },
    /// Run rounds back to back on a simulated clock
    Simulate {
        /// Number of rounds to run
        #[arg(short, long, default_value_t = 20)]
        rounds: usize,
        /// Number of bot players
        #[arg(short, long, default_value_t = 6)]
        players: usize,
        /// Seed for reproducible flips and bot choices
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Print the effective engine configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "coinflip={},coinflip_engine={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let overrides = ConfigOverrides {
        round_duration_secs: cli.round_duration_secs,
        buy_in: cli.buy_in,
        rake: cli.rake,
    };

    let result = match config::load_config(cli.config.as_deref(), &overrides) {
        Ok(engine_config) => match cli.command {
            Commands::Play { bots } => commands::play(engine_config, bots).await,
            Commands::Simulate {
                rounds,
                players,
                seed,
            } => commands::simulate(engine_config, rounds, players, seed).await,
            Commands::Config => commands::show_config(&engine_config),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        match e.downcast_ref::<EngineError>() {
            Some(EngineError::Config(msg)) => {
                eprintln!("Error: Invalid configuration: {}", msg);
                eprintln!("Use 'coinflip config' to see the defaults");
            }
            Some(err) if err.is_rejection() => {
                eprintln!("Error: {} ({})", err, err.reason_code());
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
