//! Territory-control bot binary.
//!
//! Reads the turn protocol on stdin and writes command lines on
//! stdout. Logs go to stderr so they never pollute the command
//! channel.
//!
//! # Usage
//!
//! ```bash
//! # Default policies (resource-first movement, uniform spawns)
//! dominion_bot
//!
//! # Reinforce contested continents, fixed seed, verbose logs
//! dominion_bot --spawn-policy continent-balanced --seed 7 -v
//! ```

use std::io;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use dominion_bot::runner::{run, BotConfig};
use dominion_core::allocator::{AllocatorConfig, MovementPolicy, SpawnPolicy};

#[derive(Parser)]
#[command(name = "dominion_bot")]
#[command(about = "Decision engine bot for turn-based territory control")]
#[command(version)]
struct Cli {
    /// How mobile stacks are dispatched
    #[arg(long, value_enum, default_value = "resource-then-expand")]
    movement_policy: MovementPolicyArg,

    /// Where new units are placed
    #[arg(long, value_enum, default_value = "uniform")]
    spawn_policy: SpawnPolicyArg,

    /// Fixed RNG seed (default: wall clock mixed with faction id)
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MovementPolicyArg {
    /// Resource targets first, leftovers expand to the frontier
    ResourceThenExpand,
    /// Resource targets only
    ResourceOnly,
}

impl From<MovementPolicyArg> for MovementPolicy {
    fn from(arg: MovementPolicyArg) -> Self {
        match arg {
            MovementPolicyArg::ResourceThenExpand => Self::ResourceThenExpand,
            MovementPolicyArg::ResourceOnly => Self::ResourceOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpawnPolicyArg {
    /// Uniform-random over spawnable zones
    Uniform,
    /// Seed every unclaimed zone before doubling up on friendly ones
    UnclaimedFirst,
    /// Reinforce outnumbered continents, smallest first
    ContinentBalanced,
}

impl From<SpawnPolicyArg> for SpawnPolicy {
    fn from(arg: SpawnPolicyArg) -> Self {
        match arg {
            SpawnPolicyArg::Uniform => Self::Uniform,
            SpawnPolicyArg::UnclaimedFirst => Self::UnclaimedFirst,
            SpawnPolicyArg::ContinentBalanced => Self::ContinentBalanced,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = BotConfig {
        allocator: AllocatorConfig {
            movement: cli.movement_policy.into(),
            spawn: cli.spawn_policy.into(),
        },
        seed: cli.seed,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run(stdin.lock(), stdout.lock(), config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
