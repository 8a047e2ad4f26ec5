use serde::Deserialize;
use thiserror::Error;

use crate::board::{Cell, Player, Seat, BOARD_SIZE, CELL_COUNT};

/// Wire envelope for every inbound server message. The server also attaches
/// `sender`/`recipient` routing fields, which the client never reads.
#[derive(Deserialize, Debug, Clone)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

/// Server-pushed events, decoded from the positional comma-separated
/// payloads the server emits. The payload is not self-describing: each
/// message type fixes how many leading scalars precede the board tail.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Full snapshot: seat assignment, turn owner, first-move flag and all
    /// 361 cells in row-major order.
    GameState {
        seat: Seat,
        current_player: Player,
        first_move: bool,
        cells: Vec<Cell>,
    },
    /// Single-cell delta.
    Move { row: usize, col: usize, player: Player },
    /// Turn handover.
    CurrentPlayer(Player),
    /// Game over. The server appends the winner but the client never uses it.
    Finished,
    /// Fresh game in the same session. The payload mirrors `GameState`
    /// without the seat, but the board tail is discarded: the grid is
    /// unconditionally zeroed.
    NewGame { current_player: Player, first_move: bool },
    /// A player forfeited; the other one wins.
    Resign { player: Player },
    /// Server-side rejection of something we sent (occupied cell, move out
    /// of turn). Carries human-readable text only.
    Error { message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown message type: {0}")]
    UnknownType(String),
    #[error("expected {expected} payload fields, got {found}")]
    Arity { expected: usize, found: usize },
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("not a boolean flag: {0:?}")]
    NotAFlag(String),
    #[error("player value out of range: {0}")]
    BadPlayer(i64),
    #[error("cell value out of range: {0}")]
    BadCell(i64),
    #[error("coordinate out of range: {0}")]
    BadCoordinate(i64),
}

/// Decodes one envelope into a typed event. Malformed payloads are rejected
/// here rather than letting garbage reach the board or session state; the
/// caller logs and drops the message, the connection stays up.
pub fn decode(envelope: &Envelope) -> Result<ServerEvent, DecodeError> {
    match envelope.kind.as_str() {
        "GameState" => {
            let fields = split_payload(&envelope.content);
            check_arity(&fields, 3 + CELL_COUNT)?;
            Ok(ServerEvent::GameState {
                seat: parse_seat(fields[0])?,
                current_player: parse_player(fields[1])?,
                first_move: parse_flag(fields[2])?,
                cells: parse_cells(&fields[3..])?,
            })
        }
        "Move" => {
            let fields = split_payload(&envelope.content);
            check_arity(&fields, 3)?;
            Ok(ServerEvent::Move {
                row: parse_coord(fields[0])?,
                col: parse_coord(fields[1])?,
                player: parse_player(fields[2])?,
            })
        }
        "CurrentPlayer" => {
            let fields = split_payload(&envelope.content);
            check_arity(&fields, 1)?;
            Ok(ServerEvent::CurrentPlayer(parse_player(fields[0])?))
        }
        "Finished" => Ok(ServerEvent::Finished),
        "NewGame" => {
            let fields = split_payload(&envelope.content);
            check_arity(&fields, 2 + CELL_COUNT)?;
            // consume the tail so a short payload is still rejected, but the
            // values never reach the board
            parse_cells(&fields[2..])?;
            Ok(ServerEvent::NewGame {
                current_player: parse_player(fields[0])?,
                first_move: parse_flag(fields[1])?,
            })
        }
        "Resign" => {
            let fields = split_payload(&envelope.content);
            check_arity(&fields, 1)?;
            Ok(ServerEvent::Resign {
                player: parse_player(fields[0])?,
            })
        }
        "Error" => Ok(ServerEvent::Error {
            message: envelope.content.clone(),
        }),
        other => Err(DecodeError::UnknownType(other.to_string())),
    }
}

fn split_payload(content: &str) -> Vec<&str> {
    if content.is_empty() {
        Vec::new()
    } else {
        content.split(',').collect()
    }
}

fn check_arity(fields: &[&str], expected: usize) -> Result<(), DecodeError> {
    if fields.len() != expected {
        return Err(DecodeError::Arity {
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn parse_int(field: &str) -> Result<i64, DecodeError> {
    field
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::NotANumber(field.to_string()))
}

fn parse_player(field: &str) -> Result<Player, DecodeError> {
    match parse_int(field)? {
        1 => Ok(Player::One),
        2 => Ok(Player::Two),
        other => Err(DecodeError::BadPlayer(other)),
    }
}

/// Seat is the one place where values outside {1, 2} are legal: the server
/// hands every late joiner -1 and the client treats it as spectating.
fn parse_seat(field: &str) -> Result<Seat, DecodeError> {
    match parse_int(field)? {
        1 => Ok(Seat::Player(Player::One)),
        2 => Ok(Seat::Player(Player::Two)),
        _ => Ok(Seat::Spectator),
    }
}

/// The server encodes flags as 0/1 but true/false also appears in practice.
fn parse_flag(field: &str) -> Result<bool, DecodeError> {
    match field.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(DecodeError::NotAFlag(other.to_string())),
    }
}

fn parse_coord(field: &str) -> Result<usize, DecodeError> {
    let value = parse_int(field)?;
    if !(0..BOARD_SIZE as i64).contains(&value) {
        return Err(DecodeError::BadCoordinate(value));
    }
    Ok(value as usize)
}

fn parse_cell(field: &str) -> Result<Cell, DecodeError> {
    match parse_int(field)? {
        0 => Ok(Cell::Empty),
        1 => Ok(Cell::Stone(Player::One)),
        2 => Ok(Cell::Stone(Player::Two)),
        other => Err(DecodeError::BadCell(other)),
    }
}

fn parse_cells(fields: &[&str]) -> Result<Vec<Cell>, DecodeError> {
    fields.iter().map(|f| parse_cell(f)).collect()
}

/// Commands the client sends. Everything goes out as a bare text frame; the
/// server matches on the literal string, moves are `row,col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Join(String),
    Move { row: usize, col: usize },
    NewGame,
    Resign,
}

impl ClientCommand {
    pub fn encode(&self) -> String {
        match self {
            ClientCommand::Join(game_id) => game_id.clone(),
            ClientCommand::Move { row, col } => format!("{},{}", row, col),
            ClientCommand::NewGame => "NewGame".to_string(),
            ClientCommand::Resign => "Resign".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(kind: &str, content: String) -> Envelope {
        Envelope {
            kind: kind.to_string(),
            content,
        }
    }

    fn snapshot_tail(fill: &str) -> String {
        vec![fill; CELL_COUNT].join(",")
    }

    #[test]
    fn test_envelope_from_json() {
        let env: Envelope =
            serde_json::from_str(r#"{"sender":"abc","type":"Finished","content":"2"}"#).unwrap();
        assert_eq!(env.kind, "Finished");
        assert_eq!(env.content, "2");

        // content is optional on the wire
        let env: Envelope = serde_json::from_str(r#"{"type":"Finished"}"#).unwrap();
        assert_eq!(env.content, "");
    }

    #[test]
    fn test_decode_game_state() {
        let content = format!("1,2,0,{}", snapshot_tail("0"));
        let event = decode(&envelope("GameState", content)).unwrap();
        match event {
            ServerEvent::GameState {
                seat,
                current_player,
                first_move,
                cells,
            } => {
                assert_eq!(seat, Seat::Player(Player::One));
                assert_eq!(current_player, Player::Two);
                assert!(!first_move);
                assert_eq!(cells.len(), CELL_COUNT);
                assert!(cells.iter().all(|c| *c == Cell::Empty));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_game_state_spectator_seat() {
        let content = format!("-1,1,0,{}", snapshot_tail("0"));
        let event = decode(&envelope("GameState", content)).unwrap();
        match event {
            ServerEvent::GameState { seat, .. } => assert_eq!(seat, Seat::Spectator),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_game_state_accepts_true_false_flag() {
        let content = format!("1,1,true,{}", snapshot_tail("0"));
        match decode(&envelope("GameState", content)).unwrap() {
            ServerEvent::GameState { first_move, .. } => assert!(first_move),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_move() {
        let event = decode(&envelope("Move", "4,15,2".to_string())).unwrap();
        assert_eq!(
            event,
            ServerEvent::Move {
                row: 4,
                col: 15,
                player: Player::Two
            }
        );
    }

    #[test]
    fn test_decode_move_rejects_out_of_range_coordinate() {
        assert_eq!(
            decode(&envelope("Move", "19,0,1".to_string())),
            Err(DecodeError::BadCoordinate(19))
        );
        assert_eq!(
            decode(&envelope("Move", "0,-1,1".to_string())),
            Err(DecodeError::BadCoordinate(-1))
        );
    }

    #[test]
    fn test_decode_current_player() {
        let event = decode(&envelope("CurrentPlayer", "1".to_string())).unwrap();
        assert_eq!(event, ServerEvent::CurrentPlayer(Player::One));
    }

    #[test]
    fn test_decode_finished_ignores_content() {
        // the server appends the winner, the client does not read it
        assert_eq!(
            decode(&envelope("Finished", "2".to_string())),
            Ok(ServerEvent::Finished)
        );
        assert_eq!(
            decode(&envelope("Finished", String::new())),
            Ok(ServerEvent::Finished)
        );
    }

    #[test]
    fn test_decode_new_game_discards_board_tail() {
        let content = format!("2,1,{}", snapshot_tail("1"));
        let event = decode(&envelope("NewGame", content)).unwrap();
        assert_eq!(
            event,
            ServerEvent::NewGame {
                current_player: Player::Two,
                first_move: true
            }
        );
    }

    #[test]
    fn test_decode_resign() {
        assert_eq!(
            decode(&envelope("Resign", "1".to_string())),
            Ok(ServerEvent::Resign { player: Player::One })
        );
    }

    #[test]
    fn test_decode_server_error() {
        let event = decode(&envelope("Error", "Space is already taken".to_string())).unwrap();
        assert_eq!(
            event,
            ServerEvent::Error {
                message: "Space is already taken".to_string()
            }
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(
            decode(&envelope("Chat", "hello".to_string())),
            Err(DecodeError::UnknownType("Chat".to_string()))
        );
    }

    #[test]
    fn test_decode_arity_mismatch() {
        assert_eq!(
            decode(&envelope("Move", "4,15".to_string())),
            Err(DecodeError::Arity {
                expected: 3,
                found: 2
            })
        );
        // a truncated snapshot is rejected as a whole
        assert_eq!(
            decode(&envelope("GameState", "1,1,0,0,0".to_string())),
            Err(DecodeError::Arity {
                expected: 3 + CELL_COUNT,
                found: 5
            })
        );
    }

    #[test]
    fn test_decode_non_numeric_field() {
        assert_eq!(
            decode(&envelope("Move", "a,0,1".to_string())),
            Err(DecodeError::NotANumber("a".to_string()))
        );
    }

    #[test]
    fn test_decode_bad_player_value() {
        assert_eq!(
            decode(&envelope("CurrentPlayer", "3".to_string())),
            Err(DecodeError::BadPlayer(3))
        );
        assert_eq!(
            decode(&envelope("Resign", "0".to_string())),
            Err(DecodeError::BadPlayer(0))
        );
    }

    #[test]
    fn test_decode_bad_cell_value() {
        let mut tail: Vec<String> = vec!["0".to_string(); CELL_COUNT];
        tail[100] = "7".to_string();
        let content = format!("1,1,0,{}", tail.join(","));
        assert_eq!(
            decode(&envelope("GameState", content)),
            Err(DecodeError::BadCell(7))
        );
    }

    #[test]
    fn test_encode_commands() {
        assert_eq!(ClientCommand::Move { row: 0, col: 18 }.encode(), "0,18");
        assert_eq!(ClientCommand::NewGame.encode(), "NewGame");
        assert_eq!(ClientCommand::Resign.encode(), "Resign");
        assert_eq!(ClientCommand::Join("7".to_string()).encode(), "7");
    }
}
