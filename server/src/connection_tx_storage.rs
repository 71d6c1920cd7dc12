use crate::connection::ConnectionEvent;
use drawit_system::ConnectionId;
use std::collections::HashMap;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    /// Returns `false` when the connection has no open egress channel.
    pub async fn send(&mut self, to: &ConnectionId, message: ConnectionEvent) -> bool {
        match self.connection_txs.get(to) {
            Some(tx) => {
                if tx.send(message).await.is_ok() {
                    return true;
                }
                log::warn!("Connection {} is gone, dropping its sender", to);
                self.connection_txs.remove(to);
                false
            }
            None => {
                log::debug!("No sender for connection {}", to);
                false
            }
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }
}
