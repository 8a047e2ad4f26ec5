use actix::Message;

use crate::{WsSink, WsStream};

/// The websocket handshake finished; hand both halves to the actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ConnectionEstablished {
    pub sink: WsSink,
    pub stream: WsStream,
}

/// The connection attempt itself failed, no halves to hand over.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ConnectionFailed;

/// User asked to place a stone.
#[derive(Message)]
#[rtype(result = "()")]
pub struct AttemptMove {
    pub row: usize,
    pub col: usize,
}

/// User asked for a fresh game in the same session.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RequestNewGame;

/// User forfeits.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RequestResign;

/// Snapshot of the session for presentation and tests.
#[derive(Message)]
#[rtype(result = "crate::session::GameSession")]
pub struct GetView;

/// Tear the session down: drop the writer and stop the actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;
