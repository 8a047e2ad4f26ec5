use actix::{ActorContext, AsyncContext, Handler, MessageResult, StreamHandler};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{info, warn};

use crate::protocol::{ClientCommand, Envelope, ServerEvent};
use crate::session_actor::message::{
    AttemptMove, ConnectionEstablished, ConnectionFailed, GetView, RequestNewGame, RequestResign,
    Shutdown,
};
use crate::session_actor::SessionActor;

impl Handler<ConnectionEstablished> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: ConnectionEstablished, ctx: &mut Self::Context) {
        info!("connection opened, joining game {}", self.game_id());
        self.attach_writer(msg.sink);

        // the join payload goes out before any inbound frame is processed,
        // preserving the open-before-message ordering of the transport
        let join = ClientCommand::Join(self.game_id().to_string());
        self.send_command(join);

        ctx.add_stream(msg.stream);
    }
}

impl Handler<ConnectionFailed> for SessionActor {
    type Result = ();

    fn handle(&mut self, _msg: ConnectionFailed, ctx: &mut Self::Context) {
        self.mark_connection_closed(ctx);
    }
}

impl StreamHandler<Result<WsMessage, WsError>> for SessionActor {
    fn handle(&mut self, item: Result<WsMessage, WsError>, ctx: &mut Self::Context) {
        match item {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<Envelope>(&text) {
                Ok(envelope) => {
                    // server Error events share the transient lifecycle of
                    // local gate rejections; everything else just mutates
                    // the session
                    if let Some(ServerEvent::Error { message }) =
                        self.session.handle_envelope(&envelope)
                    {
                        self.set_transient_error(message, ctx);
                    }
                }
                Err(e) => warn!("unparseable frame from server: {}", e),
            },
            Ok(WsMessage::Ping(payload)) => self.send_frame(WsMessage::Pong(payload)),
            Ok(WsMessage::Close(reason)) => {
                info!("server closed the connection: {:?}", reason);
                self.mark_connection_closed(ctx);
                self.disconnect();
            }
            Ok(_) => {}
            Err(e) => {
                warn!("websocket error: {}", e);
            }
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        info!("connection closed");
        self.mark_connection_closed(ctx);
        self.disconnect();
    }
}

impl Handler<AttemptMove> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: AttemptMove, ctx: &mut Self::Context) {
        match self.session.attempt_move(msg.row, msg.col) {
            Ok(command) => self.send_command(command),
            Err(rejection) => {
                warn!("move rejected: {}", rejection);
                self.set_transient_error(rejection.to_string(), ctx);
            }
        }
    }
}

impl Handler<RequestNewGame> for SessionActor {
    type Result = ();

    fn handle(&mut self, _msg: RequestNewGame, ctx: &mut Self::Context) {
        match self.session.request_new_game() {
            Ok(command) => self.send_command(command),
            Err(rejection) => {
                warn!("new game rejected: {}", rejection);
                self.set_transient_error(rejection.to_string(), ctx);
            }
        }
    }
}

impl Handler<RequestResign> for SessionActor {
    type Result = ();

    fn handle(&mut self, _msg: RequestResign, _ctx: &mut Self::Context) {
        let command = self.session.request_resign();
        self.send_command(command);
    }
}

impl Handler<GetView> for SessionActor {
    type Result = MessageResult<GetView>;

    fn handle(&mut self, _msg: GetView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.session.clone())
    }
}

impl Handler<Shutdown> for SessionActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        self.disconnect();
        ctx.stop();
    }
}
