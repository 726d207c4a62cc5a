//! Length-prefixed JSON transport for decision sources living in another
//! process.
//!
//! Every frame is a 4-byte big-endian length followed by that many bytes of
//! JSON. The host writes the seat id as the first frame, then one
//! [`RemoteRequest`] per decision and reads back a single answer frame whose
//! type follows from the request. A `finish` request ends the conversation
//! and expects no answer.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::players::{DecisionPort, DecisionResult};
use crate::types::JailAction;

pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),
}

pub fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), TransportError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(body.len()));
    }
    writer.write_all(&(body.len() as u32).to_be_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

pub fn read_frame<R, T>(reader: &mut R) -> Result<T, TransportError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(serde_json::from_slice(&body)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteRequest {
    StdAction {
        player_id: usize,
        state: GameSnapshot,
        available: AvailableActions,
    },
    JailAction {
        player_id: usize,
        state: GameSnapshot,
        available: Vec<JailAction>,
    },
    BuyDecision {
        player_id: usize,
        state: GameSnapshot,
        property_id: PropertyIndex,
    },
    BuyFromPlayer {
        player_id: usize,
        state: GameSnapshot,
        property_id: PropertyIndex,
        price: i64,
    },
    SellToPlayer {
        player_id: usize,
        state: GameSnapshot,
        property_id: PropertyIndex,
        price: i64,
    },
    Bidding {
        player_id: usize,
        state: GameSnapshot,
        property_id: PropertyIndex,
        current_price: i64,
        current_leader: Option<usize>,
    },
    Finish {
        outcome: GameOutcome,
        state: GameSnapshot,
    },
}

/// Host side of a connection: a seat whose answers come over `stream`.
pub struct RemotePlayer<S> {
    name: String,
    stream: S,
}

impl<S: Read + Write> RemotePlayer<S> {
    pub fn new(name: impl Into<String>, stream: S) -> Self {
        Self {
            name: name.into(),
            stream,
        }
    }

    /// Greet the peer with its seat id.
    pub fn connect(
        name: impl Into<String>,
        mut stream: S,
        seat: usize,
    ) -> Result<Self, TransportError> {
        write_frame(&mut stream, &seat)?;
        Ok(Self::new(name, stream))
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    fn ask<T: DeserializeOwned>(&mut self, request: &RemoteRequest) -> DecisionResult<T> {
        write_frame(&mut self.stream, request)?;
        Ok(read_frame(&mut self.stream)?)
    }
}

impl<S: Read + Write> DecisionPort for RemotePlayer<S> {
    fn init(&mut self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        self.ask(&RemoteRequest::StdAction {
            player_id: player,
            state: state.clone(),
            available: available.clone(),
        })
    }

    fn jail_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        self.ask(&RemoteRequest::JailAction {
            player_id: player,
            state: state.clone(),
            available: available.to_vec(),
        })
    }

    fn buy_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
    ) -> DecisionResult<bool> {
        self.ask(&RemoteRequest::BuyDecision {
            player_id: player,
            state: state.clone(),
            property_id: property,
        })
    }

    fn buy_from_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        self.ask(&RemoteRequest::BuyFromPlayer {
            player_id: player,
            state: state.clone(),
            property_id: property,
            price,
        })
    }

    fn sell_to_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        self.ask(&RemoteRequest::SellToPlayer {
            player_id: player,
            state: state.clone(),
            property_id: property,
            price,
        })
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        current_price: i64,
        current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        self.ask(&RemoteRequest::Bidding {
            player_id: player,
            state: state.clone(),
            property_id: property,
            current_price,
            current_leader,
        })
    }

    fn finish(&mut self, outcome: &GameOutcome, state: &GameSnapshot) {
        let request = RemoteRequest::Finish {
            outcome: *outcome,
            state: state.clone(),
        };
        if let Err(err) = write_frame(&mut self.stream, &request) {
            tracing::warn!(seat = %self.name, "could not deliver game result: {err}");
        }
    }
}

/// Client side of a connection: read the seat id, then answer every request
/// with `port` until the host reports the result.
pub fn answer_requests<S, P>(stream: &mut S, port: &mut P) -> Result<GameOutcome, TransportError>
where
    S: Read + Write,
    P: DecisionPort + ?Sized,
{
    let seat: usize = read_frame(stream)?;
    tracing::info!(seat, "joined game");
    port.init();
    loop {
        let request: RemoteRequest = read_frame(stream)?;
        let answered = match request {
            RemoteRequest::StdAction {
                player_id,
                state,
                available,
            } => port
                .std_action(player_id, &state, &available)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::JailAction {
                player_id,
                state,
                available,
            } => port
                .jail_action(player_id, &state, &available)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::BuyDecision {
                player_id,
                state,
                property_id,
            } => port
                .buy_decision(player_id, &state, property_id)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::BuyFromPlayer {
                player_id,
                state,
                property_id,
                price,
            } => port
                .buy_from_player_decision(player_id, &state, property_id, price)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::SellToPlayer {
                player_id,
                state,
                property_id,
                price,
            } => port
                .sell_to_player_decision(player_id, &state, property_id, price)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::Bidding {
                player_id,
                state,
                property_id,
                current_price,
                current_leader,
            } => port
                .bidding_decision(player_id, &state, property_id, current_price, current_leader)
                .map(|answer| write_frame(stream, &answer)),
            RemoteRequest::Finish { outcome, state } => {
                port.finish(&outcome, &state);
                return Ok(outcome);
            }
        };
        match answered {
            Ok(written) => written?,
            Err(err) => {
                // Hanging up is the only way to decline answering; the host
                // forfeits the seat when the read fails.
                tracing::warn!(seat, "local decision failed: {err}");
                let hangup = std::io::Error::new(std::io::ErrorKind::BrokenPipe, err.to_string());
                return Err(hangup.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::players::{DecisionError, ScriptedPlayer};
    use crate::types::{FinishReason, StdAction};

    /// Reads from a prepared buffer and records everything written.
    #[derive(Default)]
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Duplex {
        fn with_frames(frames: &[serde_json::Value]) -> Self {
            let mut input = Vec::new();
            for frame in frames {
                write_frame(&mut input, frame).unwrap();
            }
            Self {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }

        fn written<T: DeserializeOwned>(&self) -> Vec<T> {
            let mut reader = Cursor::new(self.output.clone());
            let mut frames = Vec::new();
            while (reader.position() as usize) < self.output.len() {
                frames.push(read_frame(&mut reader).unwrap());
            }
            frames
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn empty_state() -> GameSnapshot {
        GameSnapshot {
            players: Vec::new(),
            properties: Vec::new(),
            round: 2,
            current_player: 1,
            charge: None,
            sell_offer_tries: 0,
            buy_offer_tries: 0,
            std_actions_used: 0,
        }
    }

    #[test]
    fn frames_carry_a_big_endian_length() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &true).unwrap();
        assert_eq!(buffer, [0, 0, 0, 4, b't', b'r', b'u', b'e']);
        let decoded: bool = read_frame(&mut Cursor::new(buffer)).unwrap();
        assert!(decoded);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let header = ((MAX_FRAME_LEN + 1) as u32).to_be_bytes();
        let result: Result<bool, _> = read_frame(&mut Cursor::new(header.to_vec()));
        assert!(matches!(result, Err(TransportError::FrameTooLarge(_))));
    }

    #[test]
    fn requests_are_tagged_by_type() {
        let request = RemoteRequest::BuyDecision {
            player_id: 1,
            state: empty_state(),
            property_id: 7,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "buy_decision");
        assert_eq!(json["property_id"], 7);
    }

    #[test]
    fn remote_player_round_trips_a_decision() {
        let answer = serde_json::json!({"action": "Mortgage", "property_id": 3});
        let stream = Duplex::with_frames(&[answer]);
        let mut player = RemotePlayer::new("remote", stream);
        let available = AvailableActions {
            actions: vec![StdAction::NoAction, StdAction::Mortgage],
            mortgage: vec![3],
            ..AvailableActions::default()
        };
        let details = player.std_action(1, &empty_state(), &available).unwrap();
        assert_eq!(details, ActionDetails::new(StdAction::Mortgage).with_property(3));

        let sent: Vec<RemoteRequest> = player.into_inner().written();
        assert!(matches!(
            sent.as_slice(),
            [RemoteRequest::StdAction { player_id: 1, .. }]
        ));
    }

    #[test]
    fn broken_peer_surfaces_as_decision_error() {
        let stream = Duplex::default();
        let mut player = RemotePlayer::new("remote", stream);
        let result = player.buy_decision(0, &empty_state(), 0);
        assert!(matches!(result, Err(DecisionError::Transport(_))));
    }

    #[test]
    fn client_answers_until_finish() {
        let outcome = GameOutcome {
            reason: FinishReason::Win,
            winner: Some(1),
            rounds: 4,
        };
        let frames = [
            serde_json::json!(1),
            serde_json::to_value(RemoteRequest::BuyDecision {
                player_id: 1,
                state: empty_state(),
                property_id: 5,
            })
            .unwrap(),
            serde_json::to_value(RemoteRequest::Finish {
                outcome,
                state: empty_state(),
            })
            .unwrap(),
        ];
        let mut stream = Duplex::with_frames(&frames);
        let mut port = ScriptedPlayer::new(["client".to_string()]);
        port.push_buy_decision(true);

        let finished = answer_requests(&mut stream, &mut port).unwrap();
        assert_eq!(finished, outcome);
        assert_eq!(port.finished, vec![outcome]);
        assert_eq!(stream.written::<bool>(), vec![true]);
    }
}
