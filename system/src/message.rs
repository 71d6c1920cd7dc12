use crate::{Choice, ConnectionId, LineSegment, PlayerDot, StrokeEvent, VoteTally};
use serde::{Deserialize, Serialize};

/// Participant -> Coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerDrawData(PlayerDot),
    CompLineData(LineSegment),
    ClearPlayerDrawing,
    /// Sent by the main player once both drawings are finished.
    Vote,
    Voted { choice: Choice },
}

/// Coordinator -> Participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMessage {
    WaitForVote,
    /// Voting has begun. Never sent to the main connection.
    Vote,
    PlayerDrawData(PlayerDot),
    CompLineData(LineSegment),
    ClearPlayerDrawing,
    PlayerVote,
    ComputerVote,
    VotingDone(VoteTally),
    /// The command from this connection was refused; nothing changed.
    Rejected { reason: String },
}

impl From<StrokeEvent> for ServerMessage {
    fn from(event: StrokeEvent) -> Self {
        match event {
            StrokeEvent::Dot(dot) => ServerMessage::PlayerDrawData(dot),
            StrokeEvent::Line(segment) => ServerMessage::CompLineData(segment),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

impl Envelope {
    pub fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}
