use drawit_system::coordinator::QuorumPolicy;
use drawit_system::{ConnectionId, Session};
use std::num::Wrapping;

pub struct ServerState {
    pub connection_id_source: Wrapping<ConnectionId>,
    pub session: Session,
}

impl ServerState {
    pub fn new(policy: QuorumPolicy) -> Self {
        Self {
            connection_id_source: Wrapping(0),
            session: Session::new(policy),
        }
    }

    /// Allocates an id that no live connection uses. The main player's id is
    /// never handed out again, even after it leaves.
    pub fn create_connection(&mut self) -> Option<ConnectionId> {
        for _ in 0..=ConnectionId::MAX {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if candidate != 0
                && !self.session.is_live(candidate)
                && self.session.main_connection_id() != Some(candidate)
            {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_skips_ids_in_use() {
        let mut state = ServerState::new(QuorumPolicy::Live);
        let first = state.create_connection().expect("");
        state.session.join(first).expect("");
        assert_eq!(first, 1);

        state.connection_id_source = Wrapping(ConnectionId::MAX);
        let next = state.create_connection().expect("");
        assert_eq!(next, 2);
    }

    #[test]
    fn it_never_reuses_main_id() {
        let mut state = ServerState::new(QuorumPolicy::Live);
        let main = state.create_connection().expect("");
        state.session.join(main).expect("");
        state.session.leave(main);

        state.connection_id_source = Wrapping(0);
        assert_ne!(state.create_connection(), Some(main));
    }
}
