use std::net::{TcpListener, TcpStream};

use clap::{Parser, Subcommand};
use monopoly_engine::cli::create_player;
use monopoly_engine::game::{Game, GameConfig, GameSettings};
use monopoly_engine::logging::TracingLogger;
use monopoly_engine::players::{Seat, Seating};
use monopoly_engine::remote::{RemotePlayer, answer_requests};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Parser)]
#[command(name = "monopoly-serve")]
#[command(about = "Host a networked Monopoly match or join one with a bot")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wait for remote seats, fill the rest with bots and play one match
    Host {
        #[arg(long, default_value = "0.0.0.0:12345")]
        bind: String,

        /// Number of remote seats to wait for
        #[arg(long, default_value_t = 1)]
        humans: usize,

        /// Comma-separated bot codes for the remaining seats (R, H)
        #[arg(long, default_value = "H")]
        bots: String,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// TOML file with rule settings
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
    /// Connect to a host and let a local bot answer for the assigned seat
    Join {
        #[arg(long, default_value = "127.0.0.1:12345")]
        addr: String,

        #[arg(long, default_value = "H")]
        bot: String,

        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Host {
            bind,
            humans,
            bots,
            seed,
            config,
        } => host(&bind, humans, &bots, seed, config.as_deref()),
        Command::Join { addr, bot, seed } => join(&addr, &bot, seed),
    };
    if let Err(err) = result {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn host(
    bind: &str,
    humans: usize,
    bots: &str,
    seed: u64,
    config: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match config {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    let bot_codes: Vec<&str> = bots
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect();
    let total = humans + bot_codes.len();
    if !(2..=4).contains(&total) {
        return Err(format!("a match needs 2 to 4 seats, got {total}").into());
    }

    // Seats are shuffled so remote players do not always move first.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(&mut rng);
    let mut seats: Vec<Option<(String, Seat)>> = (0..total).map(|_| None).collect();

    for (code, &seat) in bot_codes.iter().zip(&order) {
        let player = create_player(code, seat, seed, &[])
            .ok_or_else(|| format!("unknown bot code '{code}'"))?;
        seats[seat] = Some(player);
    }

    let listener = TcpListener::bind(bind)?;
    tracing::info!("listening on {bind}, waiting for {humans} players");
    for &seat in &order[bot_codes.len()..] {
        let (stream, peer) = listener.accept()?;
        stream.set_nodelay(true)?;
        tracing::info!(%peer, seat, "player connected");
        let name = format!("remote-{seat}");
        let remote = RemotePlayer::connect(name.clone(), stream, seat)?;
        seats[seat] = Some((name, Box::new(remote)));
    }

    let mut seating = Seating::new();
    for (name, seat) in seats.into_iter().flatten() {
        seating.push(name, seat);
    }
    let config = GameConfig { seed, settings };
    let mut game = Game::new(config, seating, TracingLogger::new())?;
    let outcome = game.start()?;
    tracing::info!(
        game = %game.id,
        reason = %outcome.reason,
        winner = ?outcome.winner,
        rounds = outcome.rounds,
        "match finished"
    );
    Ok(())
}

fn join(addr: &str, bot: &str, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut port) =
        create_player(bot, 0, seed, &[]).ok_or_else(|| format!("unknown bot code '{bot}'"))?;
    let mut stream = TcpStream::connect(addr)?;
    stream.set_nodelay(true)?;
    let outcome = answer_requests(&mut stream, &mut port)?;
    tracing::info!(reason = %outcome.reason, winner = ?outcome.winner, "match finished");
    Ok(())
}
