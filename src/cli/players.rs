use crate::players::{HeuristicPlayer, RandomPlayer, Seat, Seating};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Chooses uniformly among the offered actions.",
    },
    CliPlayer {
        code: "H",
        name: "HeuristicPlayer",
        description: "Keeps a cash reserve, completes color sets and builds on them.",
    },
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown player code '{0}', use --help-players to list them")]
    UnknownCode(String),
    #[error("a match needs 2 to 4 seats, got {0}")]
    SeatCount(usize),
}

/// Build the decision source for one seat. `params` may carry a display name.
pub fn create_player(
    code: &str,
    seat: usize,
    seed: u64,
    params: &[&str],
) -> Option<(String, Seat)> {
    let seat_seed = seed.wrapping_add(seat as u64 * 7919);
    let (default_name, port): (&str, Seat) = match code.to_ascii_uppercase().as_str() {
        "R" => ("random", Box::new(RandomPlayer::new("random", seat_seed))),
        "H" => ("heuristic", Box::new(HeuristicPlayer::new("heuristic", seat_seed))),
        _ => return None,
    };
    let name = params
        .first()
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("{default_name}-{seat}"));
    Some((name, port))
}

/// Parse a comma separated seat list like `R,H:alice,H`.
pub fn parse_seating(spec: &str, seed: u64) -> Result<Seating, CliError> {
    let keys: Vec<&str> = spec
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .collect();
    if !(2..=4).contains(&keys.len()) {
        return Err(CliError::SeatCount(keys.len()));
    }
    let mut seating = Seating::new();
    for (seat, key) in keys.iter().enumerate() {
        let parts: Vec<&str> = key.split(':').collect();
        let (name, port) = create_player(parts[0], seat, seed, &parts[1..])
            .ok_or_else(|| CliError::UnknownCode(parts[0].to_string()))?;
        seating.push(name, port);
    }
    Ok(seating)
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
