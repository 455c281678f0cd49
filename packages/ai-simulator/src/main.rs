//! AI Simulator CLI - plays AI-vs-AI games through the turn controller.
//!
//! Every game goes through the same path a live game does: created, joined,
//! readied and started, then driven by the AI coordinator until it finishes.

mod metrics;
mod simulator;

use std::time::Instant;

use clap::Parser;
use gin_backend::config::EngineConfig;
use gin_backend::telemetry::init_tracing;
use metrics::{build_game_metrics, Summary};
use simulator::Simulator;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ai-simulator")]
#[command(about = "Plays Gin Rummy games between registered AIs")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Base seed; game n uses seed + n. Random when omitted.
    #[arg(long)]
    seed: Option<i64>,

    /// AI for player 1, as `name[:difficulty]`
    #[arg(long, default_value = "heuristic:medium")]
    p1: String,

    /// AI for player 2, as `name[:difficulty]`
    #[arg(long, default_value = "heuristic:medium")]
    p2: String,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.verbose {
        init_tracing();
    }

    let config = EngineConfig::from_env()?;

    let base_seed = args.seed.unwrap_or_else(rand::random);
    info!(games = args.games, base_seed, p1 = %args.p1, p2 = %args.p2, "Starting AI simulator");

    let simulator = Simulator::new(config, &args.p1, &args.p2);
    let start = Instant::now();
    let mut games = Vec::new();
    let mut errors = 0;

    for game in 1..=args.games {
        let seed = base_seed.wrapping_add(i64::from(game));
        let game_start = Instant::now();
        match simulator.simulate_game(i64::from(game), seed).await {
            Ok(result) => {
                let duration_ms = game_start.elapsed().as_secs_f64() * 1000.0;
                let metrics = build_game_metrics(game, seed, &result, duration_ms);
                println!("{}", serde_json::to_string(&metrics)?);
                games.push(metrics);
            }
            Err(e) => {
                errors += 1;
                warn!(game, seed, error = %e, "Game failed");
            }
        }
    }

    let summary = Summary::from_games(&games, errors);
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Simulation complete");
    println!("{}", serde_json::to_string(&serde_json::json!({ "summary": summary }))?);
    Ok(())
}
