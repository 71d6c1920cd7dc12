use crate::{Choice, ClientMessage, ConnectionId, Envelope, ServerMessage, StrokeEvent, VoteTally};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How many votes close a ballot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum QuorumPolicy {
    /// Every connection that ever joined, except the main one, must vote.
    /// Leavers are still counted, so a spectator leaving mid-vote stalls the ballot.
    Joined,
    /// Every spectator connected right now must vote. Votes from leavers stay in
    /// the tally but do not stand in for anyone still connected, and a spectator
    /// joining an open ballot is asked to vote too.
    Live,
}

impl std::default::Default for QuorumPolicy {
    fn default() -> Self {
        QuorumPolicy::Live
    }
}

impl FromStr for QuorumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined" => Ok(QuorumPolicy::Joined),
            "live" => Ok(QuorumPolicy::Live),
            other => Err(format!("unknown quorum policy `{}`", other)),
        }
    }
}

impl fmt::Display for QuorumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumPolicy::Joined => write!(f, "joined"),
            QuorumPolicy::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Ballot {
    Closed,
    Open,
    Counted,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub ordinal: usize,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CoordinatorError {
    #[error("connection {0} is already joined")]
    DuplicateConnection(ConnectionId),
    #[error("connection {0} is not joined")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} is not the main player")]
    NotMainConnection(ConnectionId),
    #[error("the main player cannot vote")]
    MainConnectionCannotVote,
    #[error("voting is not open")]
    VotingNotOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub main_connection_id: Option<ConnectionId>,
    pub connection_count: usize,
    pub connections: Vec<Connection>,
    pub policy: QuorumPolicy,
    pub quorum: usize,
    pub ballot: Ballot,
    pub votes_received: usize,
    pub pending_voters: Vec<ConnectionId>,
    pub tally: VoteTally,
}

/// Shared state of the single game session. Only the operations below mutate it,
/// and the owner must call them from one task.
pub struct Session {
    policy: QuorumPolicy,
    main_connection_id: Option<ConnectionId>,
    connection_count: usize,
    connections: Vec<Connection>,
    ballot: Ballot,
    votes_received: usize,
    voters: HashSet<ConnectionId>,
    tally: VoteTally,
}

impl Session {
    pub fn new(policy: QuorumPolicy) -> Self {
        Self {
            policy,
            main_connection_id: None,
            connection_count: 0,
            connections: Vec::new(),
            ballot: Ballot::Closed,
            votes_received: 0,
            voters: HashSet::new(),
            tally: VoteTally::default(),
        }
    }

    pub fn main_connection_id(&self) -> Option<ConnectionId> {
        self.main_connection_id
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    pub fn votes_received(&self) -> usize {
        self.votes_received
    }

    pub fn tally(&self) -> VoteTally {
        self.tally
    }

    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    pub fn is_live(&self, connection_id: ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id == connection_id)
    }

    pub fn live_connection_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.iter().map(|c| c.id)
    }

    pub fn quorum(&self) -> usize {
        match self.policy {
            QuorumPolicy::Joined => self.connection_count.saturating_sub(1),
            QuorumPolicy::Live => self.spectator_ids().count(),
        }
    }

    /// Live spectators that have not voted in the open ballot.
    pub fn pending_voters(&self) -> Vec<ConnectionId> {
        if self.ballot != Ballot::Open {
            return Vec::new();
        }
        self.spectator_ids()
            .filter(|id| !self.voters.contains(id))
            .collect()
    }

    fn spectator_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections
            .iter()
            .map(|c| c.id)
            .filter(move |id| Some(*id) != self.main_connection_id)
    }

    pub fn join(&mut self, connection_id: ConnectionId) -> Result<Vec<Envelope>, CoordinatorError> {
        if self.is_live(connection_id) {
            return Err(CoordinatorError::DuplicateConnection(connection_id));
        }
        self.connection_count += 1;
        let ordinal = self.connection_count;
        self.connections.push(Connection {
            id: connection_id,
            ordinal,
        });
        log::info!("Connection #{}: {}", ordinal, connection_id);

        if self.main_connection_id.is_none() {
            self.main_connection_id = Some(connection_id);
            log::info!("Connection {} is the main player", connection_id);
            Ok(Vec::new())
        } else {
            let mut envelopes = vec![Envelope::new(connection_id, ServerMessage::WaitForVote)];
            if self.ballot == Ballot::Open && self.policy == QuorumPolicy::Live {
                log::info!("Connection {} joined an open ballot", connection_id);
                envelopes.push(Envelope::new(connection_id, ServerMessage::Vote));
            }
            Ok(envelopes)
        }
    }

    pub fn leave(&mut self, connection_id: ConnectionId) -> Vec<Envelope> {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != connection_id);
        if self.connections.len() == before {
            log::warn!("Connection {} left without joining", connection_id);
            return Vec::new();
        }
        log::info!("Connection {} left", connection_id);

        if self.main_connection_id == Some(connection_id) {
            log::warn!("The main player left; vote results will not be delivered");
        }
        self.complete_if_quorum_met()
    }

    pub fn handle_message(
        &mut self,
        from: ConnectionId,
        message: ClientMessage,
    ) -> Result<Vec<Envelope>, CoordinatorError> {
        if !self.is_live(from) {
            return Err(CoordinatorError::UnknownConnection(from));
        }
        match message {
            ClientMessage::PlayerDrawData(dot) => Ok(self.on_stroke_event(StrokeEvent::Dot(dot))),
            ClientMessage::CompLineData(segment) => {
                Ok(self.on_stroke_event(StrokeEvent::Line(segment)))
            }
            ClientMessage::ClearPlayerDrawing => Ok(self.on_clear()),
            ClientMessage::Vote => self.on_start_vote(from),
            ClientMessage::Voted { choice } => self.on_vote_cast(choice, from),
        }
    }

    /// Strokes go to every live connection, the origin included, so that every
    /// board accumulates the same picture.
    pub fn on_stroke_event(&self, event: StrokeEvent) -> Vec<Envelope> {
        self.broadcast(ServerMessage::from(event), None)
    }

    pub fn on_clear(&self) -> Vec<Envelope> {
        self.broadcast(ServerMessage::ClearPlayerDrawing, None)
    }

    pub fn on_start_vote(&mut self, from: ConnectionId) -> Result<Vec<Envelope>, CoordinatorError> {
        if self.main_connection_id != Some(from) {
            return Err(CoordinatorError::NotMainConnection(from));
        }
        self.ballot = Ballot::Open;
        self.votes_received = 0;
        self.voters.clear();
        self.tally = VoteTally::default();
        log::info!("Voting started, waiting for {} vote(s)", self.quorum());

        let mut envelopes = self.broadcast(ServerMessage::Vote, Some(from));
        envelopes.extend(self.complete_if_quorum_met());
        Ok(envelopes)
    }

    pub fn on_vote_cast(
        &mut self,
        choice: Choice,
        from: ConnectionId,
    ) -> Result<Vec<Envelope>, CoordinatorError> {
        if self.main_connection_id == Some(from) {
            return Err(CoordinatorError::MainConnectionCannotVote);
        }
        if self.ballot != Ballot::Open {
            return Err(CoordinatorError::VotingNotOpen);
        }
        self.votes_received += 1;
        self.voters.insert(from);
        self.tally.record(choice);
        log::debug!(
            "Vote {}/{} from {}: {:?}",
            self.votes_received,
            self.quorum(),
            from,
            choice
        );

        let notice = match choice {
            Choice::Player => ServerMessage::PlayerVote,
            Choice::Computer => ServerMessage::ComputerVote,
        };
        let mut envelopes: Vec<Envelope> = self.to_main(notice).into_iter().collect();
        envelopes.extend(self.complete_if_quorum_met());
        Ok(envelopes)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            main_connection_id: self.main_connection_id,
            connection_count: self.connection_count,
            connections: self.connections.clone(),
            policy: self.policy,
            quorum: self.quorum(),
            ballot: self.ballot,
            votes_received: self.votes_received,
            pending_voters: self.pending_voters(),
            tally: self.tally,
        }
    }

    fn quorum_met(&self) -> bool {
        match self.policy {
            QuorumPolicy::Joined => self.votes_received >= self.quorum(),
            QuorumPolicy::Live => self.spectator_ids().all(|id| self.voters.contains(&id)),
        }
    }

    fn complete_if_quorum_met(&mut self) -> Vec<Envelope> {
        if self.ballot != Ballot::Open || !self.quorum_met() {
            return Vec::new();
        }
        self.ballot = Ballot::Counted;
        log::info!(
            "All votes counted: player {}, computer {}",
            self.tally.player,
            self.tally.computer
        );

        // Main first, then spectators in join order.
        let done = ServerMessage::VotingDone(self.tally);
        let mut envelopes: Vec<Envelope> = self.to_main(done.clone()).into_iter().collect();
        envelopes.extend(self.broadcast(done, self.main_connection_id));
        envelopes
    }

    fn to_main(&self, message: ServerMessage) -> Option<Envelope> {
        match self.main_connection_id {
            Some(main) if self.is_live(main) => Some(Envelope::new(main, message)),
            _ => {
                log::warn!("Dropping {:?}: main player is not connected", message);
                None
            }
        }
    }

    fn broadcast(&self, message: ServerMessage, without: Option<ConnectionId>) -> Vec<Envelope> {
        self.connections
            .iter()
            .filter(|c| Some(c.id) != without)
            .map(|c| Envelope::new(c.id, message.clone()))
            .collect()
    }
}
