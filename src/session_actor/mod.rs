use actix::{Actor, AsyncContext, Context, ContextFutureSpawner, SpawnHandle, WrapFuture};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{error, info, warn};
use url::Url;

use crate::protocol::ClientCommand;
use crate::session::GameSession;
use crate::session_actor::message::{ConnectionEstablished, ConnectionFailed};
use crate::{WsSink, WsStream, CONNECTION_TIMEOUT};

pub mod handler;
pub mod message;

/// Owns one game session and its websocket. All transport notifications and
/// user commands arrive as actor messages on one context, so the session
/// state has exactly one writer at a time and needs no locking.
pub struct SessionActor {
    pub session: GameSession,
    game_id: String,
    ws_url: String,
    outbound: Option<mpsc::UnboundedSender<WsMessage>>,
    error_clear: Option<SpawnHandle>,
}

impl SessionActor {
    pub fn new(ws_url: String, game_id: String) -> Self {
        Self {
            session: GameSession::new(),
            game_id,
            ws_url,
            outbound: None,
            error_clear: None,
        }
    }

    async fn establish_connection(ws_url: &str) -> Result<(WsSink, WsStream), ()> {
        let url = Url::parse(ws_url).map_err(|e| error!("Invalid URL: {}", e))?;

        let (ws_stream, _) = tokio::time::timeout(CONNECTION_TIMEOUT, connect_async(url.as_str()))
            .await
            .map_err(|_| error!("Connection timeout"))?
            .map_err(|e| error!("Connection failed: {}", e))?;

        let (sink, stream) = ws_stream.split();

        Ok((sink, stream))
    }

    pub(crate) fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Fire-and-forget send, matching the transport contract: nothing in the
    /// session logic depends on a return value.
    pub(crate) fn send_text(&self, text: String) {
        match &self.outbound {
            Some(tx) => {
                if tx.send(WsMessage::Text(text)).is_err() {
                    warn!("writer task is gone, dropping outbound frame");
                }
            }
            None => warn!("not connected, dropping outbound frame"),
        }
    }

    pub(crate) fn send_frame(&self, frame: WsMessage) {
        if let Some(tx) = &self.outbound {
            let _ = tx.send(frame);
        }
    }

    pub(crate) fn send_command(&self, command: ClientCommand) {
        self.send_text(command.encode());
    }

    pub(crate) fn attach_writer(&mut self, mut sink: WsSink) {
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
        tokio::spawn(async move {
            use futures_util::SinkExt;
            while let Some(frame) = rx.recv().await {
                if sink.send(frame).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });
        self.outbound = Some(tx);
    }

    pub(crate) fn disconnect(&mut self) {
        // dropping the sender ends the writer task, which closes the sink
        self.outbound = None;
    }

    /// Surfaces a transient error and re-arms the auto-clear. Cancelling the
    /// previous timer keeps a stale clear from wiping a newer message when
    /// errors land inside the 2 second window.
    pub(crate) fn set_transient_error(&mut self, message: String, ctx: &mut Context<Self>) {
        self.session.error_message = Some(message);
        self.cancel_error_clear(ctx);
        self.error_clear = Some(ctx.run_later(crate::ERROR_CLEAR_DELAY, |act, _ctx| {
            act.error_clear = None;
            act.session.clear_error();
        }));
    }

    /// The closure message is persistent: a clear still pending from an
    /// earlier transient error must not wipe it.
    pub(crate) fn mark_connection_closed(&mut self, ctx: &mut Context<Self>) {
        self.cancel_error_clear(ctx);
        self.session.set_connection_closed();
    }

    fn cancel_error_clear(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.error_clear.take() {
            ctx.cancel_future(handle);
        }
    }
}

impl Actor for SessionActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let ws_url = self.ws_url.clone();

        async move {
            match Self::establish_connection(&ws_url).await {
                Ok((sink, stream)) => {
                    addr.do_send(ConnectionEstablished { sink, stream });
                }
                Err(()) => {
                    error!("failed to reach game server at {}", ws_url);
                    addr.do_send(ConnectionFailed);
                }
            }
        }
        .into_actor(self)
        .wait(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("session actor stopped");
    }
}
