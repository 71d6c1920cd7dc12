use std::collections::VecDeque;
use tokio::sync::mpsc::{channel, Sender};

use drawit_system::coordinator::QuorumPolicy;
use drawit_system::{Envelope, ServerMessage};

use super::connection::{ConnectionCommand, ConnectionEvent};
use crate::admin::AdminCommand;
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::ServerState;

const SERVER_BUFFER: usize = 1024;

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    AdminCommand(AdminCommand),
}

struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new(policy: QuorumPolicy) -> Self {
        Self {
            server_state: ServerState::new(policy),
            connections: ConnectionTxStorage::new(),
        }
    }

    async fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command).await,
            ServerCommand::AdminCommand(command) => self.handle_admin_command(command),
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = match self.server_state.create_connection() {
                    Some(connection_id) => connection_id,
                    None => {
                        log::error!("No connection id left, refusing connection");
                        return;
                    }
                };
                self.connections.insert(connection_id, tx);
                let delivered = self
                    .connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
                if !delivered {
                    log::info!("Connection {} closed before joining", connection_id);
                    return;
                }
                match self.server_state.session.join(connection_id) {
                    Ok(envelopes) => self.dispatch(envelopes).await,
                    Err(err) => log::error!("Join failed: {}", err),
                }
            }
            ConnectionCommand::Disconnect { from } => {
                self.connections.remove(&from);
                let envelopes = self.server_state.session.leave(from);
                self.dispatch(envelopes).await;
            }
            ConnectionCommand::ClientMessage { from, message } => {
                match self.server_state.session.handle_message(from, message) {
                    Ok(envelopes) => self.dispatch(envelopes).await,
                    Err(err) => {
                        log::warn!("Rejected command from {}: {}", from, err);
                        let reason = err.to_string();
                        self.dispatch(vec![Envelope::new(from, ServerMessage::Rejected { reason })])
                            .await;
                    }
                }
            }
        }
    }

    fn handle_admin_command(&self, command: AdminCommand) {
        match command {
            AdminCommand::GetSessionSnapshot { tx } => {
                if tx.send(self.server_state.session.snapshot()).is_err() {
                    log::warn!("Admin request went away before the snapshot was ready");
                }
            }
        }
    }

    /// A connection whose egress channel is closed is treated as having left,
    /// so it cannot hold a ballot open.
    async fn dispatch(&mut self, envelopes: Vec<Envelope>) {
        let mut queue = VecDeque::from(envelopes);
        while let Some(Envelope { to, message }) = queue.pop_front() {
            let delivered = self
                .connections
                .send(&to, ConnectionEvent::ServerMessage(message))
                .await;
            if !delivered && self.server_state.session.is_live(to) {
                log::info!("Connection {} went away without a disconnect", to);
                queue.extend(self.server_state.session.leave(to));
            }
        }
    }
}

pub fn spawn_server(policy: QuorumPolicy) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(SERVER_BUFFER);

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(policy));
        log::info!("server started (vote quorum: {})", policy);

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command).await;
        }
        log::info!("server terminated");
    });

    srv_tx
}
