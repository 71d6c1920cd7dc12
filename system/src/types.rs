use serde::{Deserialize, Serialize};
use std::fmt;

pub type ConnectionId = u16;

/// Width and height of every drawing surface, in pixels.
pub const CANVAS_WIDTH: f32 = 640.0;
pub const CANVAS_HEIGHT: f32 = 480.0;

/// A single pen sample from the human player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDot {
    pub x_center: f32,
    pub y_center: f32,
    pub size: f32,
}

/// A straight segment produced by the generative model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrokeEvent {
    Dot(PlayerDot),
    Line(LineSegment),
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Player,
    Computer,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenState {
    Down,
    Up,
    End,
}

/// Relative pen movement emitted by the generative model. `pen` describes the
/// state of the pen for the *next* movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeDelta {
    pub dx: f32,
    pub dy: f32,
    pub pen: PenState,
}

impl StrokeDelta {
    pub fn new(dx: f32, dy: f32, pen: PenState) -> Self {
        Self { dx, dy, pen }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    NewGame,
    Choose,
    PlayerDraw,
    ComputerDraw,
    Vote,
    Voted,
    EndGame,
}

impl std::default::Default for GameState {
    fn default() -> Self {
        GameState::NewGame
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub player: u32,
    pub computer: u32,
}

impl VoteTally {
    pub fn record(&mut self, choice: Choice) {
        match choice {
            Choice::Player => self.player += 1,
            Choice::Computer => self.computer += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.player + self.computer
    }

    pub fn outcome(&self) -> Outcome {
        if self.player > self.computer {
            Outcome::PlayerWins
        } else if self.computer > self.player {
            Outcome::ComputerWins
        } else {
            Outcome::Tie
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWins,
    ComputerWins,
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::PlayerWins => write!(f, "Player wins!"),
            Outcome::ComputerWins => write!(f, "Computer wins!"),
            Outcome::Tie => write!(f, "It's a tie!"),
        }
    }
}
