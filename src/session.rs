use thiserror::Error;
use tracing::{debug, warn};

use crate::board::{Board, Cell, Player, Seat, BOARD_SIZE};
use crate::protocol::{decode, ClientCommand, Envelope, ServerEvent};

/// A user action the move gate refused locally. The display strings are the
/// ones surfaced to the user through the transient error field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionRejected {
    #[error("Game is finished")]
    GameFinished,
    #[error("you're player: {seat}, not the current player: {current}")]
    NotYourTurn { seat: String, current: String },
    #[error("Game is not finished yet")]
    GameNotFinished,
    #[error("there is no cell {row},{col}")]
    OffBoard { row: usize, col: usize },
}

/// The client's view of one game session: the board, who we are, whose turn
/// it is and whether the game is over. Server events mutate it through
/// [`GameSession::apply`]; user actions go through the move gate, which
/// either hands back the outbound command or rejects with an error that is
/// also recorded in `error_message`.
///
/// Only the server re-arms a finished session (`NewGame`/`GameState`); the
/// client never decides wins locally.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    pub board: Board,
    /// Assigned by the first `GameState` of the connection, fixed afterwards.
    pub seat: Option<Seat>,
    pub current_player: Option<Player>,
    /// Opaque protocol flag (second stone of a Connect6 turn); carried for
    /// display, never consulted by the gate.
    pub first_move: bool,
    pub finished: bool,
    pub info_message: Option<String>,
    pub error_message: Option<String>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and applies one inbound envelope. Protocol anomalies are
    /// logged and dropped here; they never reach the caller and never touch
    /// state. Returns the applied event so the caller can react to it.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Option<ServerEvent> {
        match decode(envelope) {
            Ok(event) => {
                debug!("applying server event: {:?}", event);
                self.apply(event.clone());
                Some(event)
            }
            Err(err) => {
                warn!("dropping message of type {:?}: {}", envelope.kind, err);
                None
            }
        }
    }

    /// Applies a server event. The server is authoritative: these mutations
    /// are always permitted, finished or not, and may overwrite optimistic
    /// local moves.
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::GameState {
                seat,
                current_player,
                first_move,
                cells,
            } => {
                if self.seat.is_none() {
                    self.seat = Some(seat);
                }
                self.current_player = Some(current_player);
                self.first_move = first_move;
                self.board.load_snapshot(&cells);
                self.finished = false;
            }
            ServerEvent::Move { row, col, player } => {
                self.board.set(row, col, Cell::Stone(player));
            }
            ServerEvent::CurrentPlayer(player) => {
                self.current_player = Some(player);
            }
            ServerEvent::Finished => {
                self.finished = true;
            }
            ServerEvent::NewGame {
                current_player,
                first_move,
            } => {
                self.current_player = Some(current_player);
                self.first_move = first_move;
                self.board.reset();
                self.finished = false;
            }
            ServerEvent::Resign { player } => {
                self.finished = true;
                self.info_message = Some(format!("player {} won!", player.opponent()));
            }
            ServerEvent::Error { message } => {
                self.error_message = Some(message);
            }
        }
    }

    /// The move gate. Turn ownership and lifecycle are checked locally;
    /// occupancy is deliberately not, the server is the authority and will
    /// correct us through a later event if the cell was taken.
    pub fn attempt_move(&mut self, row: usize, col: usize) -> Result<ClientCommand, ActionRejected> {
        // the board itself only accepts decoder-validated indices; user
        // input gets rejected here like any other gate violation
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(self.reject(ActionRejected::OffBoard { row, col }));
        }

        if self.finished {
            return Err(self.reject(ActionRejected::GameFinished));
        }

        let mover = match (self.seat.and_then(|s| s.player()), self.current_player) {
            (Some(me), Some(current)) if me == current => me,
            _ => {
                return Err(self.reject(ActionRejected::NotYourTurn {
                    seat: self.seat_label(),
                    current: self.current_label(),
                }))
            }
        };

        // optimistic: placed before the server confirms
        self.board.set(row, col, Cell::Stone(mover));
        Ok(ClientCommand::Move { row, col })
    }

    /// Only meaningful once the game is over; the server rejects it anyway,
    /// but gating locally gives the user an immediate answer.
    pub fn request_new_game(&mut self) -> Result<ClientCommand, ActionRejected> {
        self.info_message = None;
        if !self.finished {
            return Err(self.reject(ActionRejected::GameNotFinished));
        }
        Ok(ClientCommand::NewGame)
    }

    /// Resignation is always allowed to go out; whether it means anything
    /// (spectators, finished games) is the server's call.
    pub fn request_resign(&self) -> ClientCommand {
        ClientCommand::Resign
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_connection_closed(&mut self) {
        // persistent, unlike gate rejections: no timer clears it
        self.error_message = Some("connection closed".to_string());
    }

    fn reject(&mut self, rejection: ActionRejected) -> ActionRejected {
        self.error_message = Some(rejection.to_string());
        rejection
    }

    fn seat_label(&self) -> String {
        match self.seat {
            Some(seat) => seat.to_string(),
            None => "unassigned".to_string(),
        }
    }

    fn current_label(&self) -> String {
        match self.current_player {
            Some(player) => player.to_string(),
            None => "unknown".to_string(),
        }
    }
}
