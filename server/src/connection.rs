use actix::prelude::SendError;
use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use drawit_system::{
    decode_binary, decode_text, ClientMessage, Codec, CodecError, ConnectionId, Frame,
    ServerMessage,
};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};
use actix_web_actors::ws::{CloseCode, CloseReason};

const EGRESS_BUFFER: usize = 256;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientMessage {
        from: ConnectionId,
        message: ClientMessage,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    ServerMessage(ServerMessage),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    /// Replies use the encoding of the last frame received from the client.
    codec: Codec,
}

impl ConnectionActor {
    fn forward(
        &mut self,
        decoded: Result<ClientMessage, CodecError>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        match decoded {
            Ok(message) => {
                log::debug!("Ingress {:?}", message);
                if let ConnectionState::Connected(from) = self.state {
                    let command =
                        ServerCommand::Connection(ConnectionCommand::ClientMessage { from, message });
                    if let Err(err) = self.srv_tx.try_send(command) {
                        log::warn!("Dropping message from {}: {}", from, err);
                    }
                } else {
                    log::debug!("Ingress before connection was registered");
                }
            }
            Err(err) => {
                log::warn!("Closing connection: {}", err);
                ctx.close(Some(CloseReason {
                    code: CloseCode::Invalid,
                    description: Some(err.to_string()),
                }));
                ctx.stop();
            }
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(EGRESS_BUFFER);

        if let Err(err) = self
            .srv_tx
            .try_send(ServerCommand::Connection(ConnectionCommand::Connect { tx }))
        {
            log::error!("Server refused a new connection: {}", err);
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();
        let srv_tx = self.srv_tx.clone();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            while let Some(event) = rx.recv().await {
                let unannounced = match event {
                    ConnectionEvent::Connected { connection_id } => Some(connection_id),
                    _ => None,
                };
                match addr.try_send(ConnectionActorMessage(event)) {
                    Ok(()) => {}
                    Err(SendError::Full(msg)) => addr.do_send(msg),
                    Err(SendError::Closed(_)) => {
                        // The actor stopped before it learned its id, so nobody else reports it.
                        if let Some(from) = unannounced {
                            let command =
                                ServerCommand::Connection(ConnectionCommand::Disconnect { from });
                            if srv_tx.send(command).await.is_err() {
                                log::error!("Could not report disconnect of {}", from);
                            }
                        }
                        break;
                    }
                }
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            if let Err(err) = self
                .srv_tx
                .try_send(ServerCommand::Connection(ConnectionCommand::Disconnect {
                    from: id,
                }))
            {
                log::error!("Could not report disconnect of {}: {}", id, err);
            }
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                self.codec = Codec::Json;
                self.forward(decode_text(&text), ctx);
            }
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ingress size: {}", bin.len());
                self.codec = Codec::Bincode;
                self.forward(decode_binary(&bin), ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                log::warn!("Protocol error: {}", err);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let connection_event = msg.0;
        log::debug!("Egress {:?}", connection_event);
        match connection_event {
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(connection_id);
            }
            ConnectionEvent::ServerMessage(message) => match self.codec.encode(&message) {
                Ok(Frame::Text(text)) => ctx.text(text),
                Ok(Frame::Binary(bytes)) => ctx.binary(bytes),
                Err(err) => log::error!("Cannot encode {:?}: {}", message, err),
            },
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Idle,
            codec: Codec::Json,
        },
        &req,
        stream,
    )
}
