use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use clap::Parser;
use monopoly_engine::cli::{StatisticsAccumulator, parse_seating, print_player_help};
use monopoly_engine::game::{Game, GameConfig, GameError, GameOutcome, GameSettings};
use monopoly_engine::logging::{GameLogger, NullLogger, TracingLogger};
use monopoly_engine::players::{DecisionPort, Seating};

#[derive(Debug, Parser, Clone)]
#[command(name = "monopoly-sim")]
#[command(about = "Monopoly Simulator - play many matches between bot strategies")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated seat codes (e.g. R,R,H,H). Use ':' to name a seat (H:alice)
    #[arg(long, default_value = "R,R,H,H")]
    players: String,

    /// Random seed; game i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML file with rule settings; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the round limit
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence per-game output
    #[arg(long)]
    quiet: bool,

    /// Route every game event through tracing (use RUST_LOG to filter)
    #[arg(long)]
    verbose: bool,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    if args.help_players {
        print_player_help();
        return;
    }

    // Validate the seat list once up front so workers cannot fail on it.
    let seat_names = match parse_seating(&args.players, args.seed) {
        Ok(mut seating) => seating.init(),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let mut settings = match &args.config {
        Some(path) => GameSettings::load(path).unwrap_or_else(|err| {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }),
        None => GameSettings::default(),
    };
    if let Some(max_rounds) = args.max_rounds {
        settings.max_rounds = max_rounds;
    }
    if let Err(err) = settings.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let mut stats = StatisticsAccumulator::new();
    if args.workers > 1 {
        run_parallel_simulations(&args, &settings, &mut stats);
    } else {
        run_sequential_simulations(&args, &settings, &mut stats);
    }

    if !args.quiet {
        print_summary(&stats, &seat_names);
    }
}

fn play_game<L: GameLogger>(
    config: GameConfig,
    seating: Seating,
    logger: L,
    stats: &mut StatisticsAccumulator,
) -> Result<GameOutcome, GameError> {
    let start = Instant::now();
    let seed = config.seed;
    let mut game = Game::new(config, seating, logger)?;
    tracing::debug!(game = %game.id, seed, "game started");
    let outcome = game.start()?;
    stats.after(&game, &outcome, start.elapsed());
    Ok(outcome)
}

fn run_game(
    args: &Args,
    settings: &GameSettings,
    game_idx: u64,
    stats: &mut StatisticsAccumulator,
) -> Option<GameOutcome> {
    let seed = args.seed + game_idx;
    let seating = parse_seating(&args.players, seed).ok()?;
    let config = GameConfig {
        seed,
        settings: settings.clone(),
    };
    let result = if args.verbose {
        play_game(config, seating, TracingLogger::new(), stats)
    } else {
        play_game(config, seating, NullLogger, stats)
    };
    match result {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            tracing::error!(game = game_idx, "game aborted: {err}");
            None
        }
    }
}

fn run_sequential_simulations(
    args: &Args,
    settings: &GameSettings,
    stats: &mut StatisticsAccumulator,
) {
    for game_idx in 0..args.num {
        let Some(outcome) = run_game(args, settings, u64::from(game_idx), stats) else {
            continue;
        };
        if args.quiet {
            continue;
        }
        let last_n = 10;
        if game_idx < last_n || game_idx >= args.num.saturating_sub(last_n) {
            let winner = outcome
                .winner
                .map(|seat| seat.to_string())
                .unwrap_or_else(|| "None".to_string());
            println!(
                "Game {:>4}: Result={:>11}, Winner={:>4}, Rounds={:>4}",
                game_idx + 1,
                outcome.reason,
                winner,
                outcome.rounds
            );
        } else if (game_idx + 1) % 100 == 0 {
            use std::io::Write;
            print!(".");
            let _ = std::io::stdout().flush();
        }
    }
}

fn run_parallel_simulations(
    args: &Args,
    settings: &GameSettings,
    stats: &mut StatisticsAccumulator,
) {
    let args = Arc::new(args.clone());
    let settings = Arc::new(settings.clone());
    let games_per_worker = args.num as usize / args.workers;
    let remainder = args.num as usize % args.workers;

    let mut handles = Vec::new();
    for worker_id in 0..args.workers {
        let args = Arc::clone(&args);
        let settings = Arc::clone(&settings);
        let num_games = if worker_id < remainder {
            games_per_worker + 1
        } else {
            games_per_worker
        };

        handles.push(thread::spawn(move || {
            let mut local_stats = StatisticsAccumulator::new();
            let start_idx = worker_id * games_per_worker + worker_id.min(remainder);
            for local_idx in 0..num_games {
                let game_idx = (start_idx + local_idx) as u64;
                run_game(&args, &settings, game_idx, &mut local_stats);
            }
            local_stats
        }));
    }

    for handle in handles {
        match handle.join() {
            Ok(worker_stats) => stats.stats.merge(worker_stats.stats),
            Err(_) => tracing::error!("simulation worker panicked"),
        }
    }
}

fn print_summary(stats: &StatisticsAccumulator, seat_names: &[String]) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer Summary:");
    println!(
        "{:<20} {:<10} {:<12} {:<12}",
        "Player", "Wins", "Win Rate", "Avg Worth"
    );
    println!("{}", "-".repeat(56));
    for (seat, name) in seat_names.iter().enumerate() {
        let wins = stats.stats.wins.get(&seat).copied().unwrap_or(0);
        println!(
            "{:<20} {:<10} {:<11.1}% {:<12.2}",
            format!("{name} ({seat})"),
            wins,
            stats.stats.win_rate(seat),
            stats.stats.get_avg_net_worth(seat)
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.stats.games);
    println!("  Draws: {}", stats.stats.draws);
    println!("  Round Limit Finishes: {}", stats.stats.round_limit_finishes);
    println!("  Avg Rounds: {:.2}", stats.stats.get_avg_rounds());
    println!("  Avg Duration: {:.2?}", stats.stats.get_avg_duration());
}
