//! Matches played with one seat answered over a loopback TCP connection.

use std::net::{TcpListener, TcpStream};
use std::thread;

use monopoly_engine::game::{Game, GameConfig, GameSettings};
use monopoly_engine::logging::NullLogger;
use monopoly_engine::players::{HeuristicPlayer, RandomPlayer, Seating};
use monopoly_engine::remote::{RemotePlayer, answer_requests, read_frame};
use monopoly_engine::types::FinishReason;

fn short_match(seed: u64) -> GameConfig {
    GameConfig {
        seed,
        settings: GameSettings {
            max_rounds: 10,
            ..GameSettings::default()
        },
    }
}

#[test]
fn remote_seat_plays_a_full_match() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        let mut port = RandomPlayer::new("client", 5);
        answer_requests(&mut stream, &mut port).unwrap()
    });

    let (stream, _) = listener.accept().unwrap();
    let remote = RemotePlayer::connect("remote-0", stream, 0).unwrap();
    let seating = Seating::new()
        .with_seat("remote-0", Box::new(remote))
        .with_seat("heuristic-1", Box::new(HeuristicPlayer::new("heuristic", 9)));
    let mut game = Game::new(short_match(21), seating, NullLogger).unwrap();
    let outcome = game.start().unwrap();

    let seen_by_client = client.join().unwrap();
    assert_eq!(seen_by_client, outcome);
    assert!(outcome.rounds <= 10);
    assert!(game.is_finished());
    assert_eq!(game.outcome(), Some(outcome));
}

#[test]
fn hung_up_client_forfeits_its_seat() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        let seat: usize = read_frame(&mut stream).unwrap();
        seat
    });

    let (stream, _) = listener.accept().unwrap();
    let remote = RemotePlayer::connect("remote-0", stream, 0).unwrap();
    assert_eq!(client.join().unwrap(), 0);

    let seating = Seating::new()
        .with_seat("remote-0", Box::new(remote))
        .with_seat("heuristic-1", Box::new(HeuristicPlayer::new("heuristic", 9)));
    let mut game = Game::new(short_match(4), seating, NullLogger).unwrap();
    let outcome = game.start().unwrap();

    assert_eq!(outcome.reason, FinishReason::Win);
    assert_eq!(outcome.winner, Some(1));
    assert!(game.players()[0].is_bankrupt);
}
