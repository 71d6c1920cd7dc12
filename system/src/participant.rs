use crate::model::{ComputerPen, ModelError};
use crate::{
    Choice, ClientMessage, GameState, LineSegment, PenState, PlayerDot, ServerMessage,
    StrokeDelta, VoteTally,
};
use serde::{Deserialize, Serialize};

/// Line the hardware sends while the player picks a word.
pub const CHOOSING_WORD: &str = "choosing word";

const PEN_SIZE: f32 = 20.0;

/// Events from the serial link to the hardware device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SerialEvent {
    ConnectionOpened,
    ConnectionClosed,
    DataReceived(String),
    ErrorOccurred(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocalInput {
    PointerDrag { x: f32, y: f32 },
    Key(char),
    /// The player is done drawing.
    Finish,
    BeginVoting,
    CastVote(Choice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantEvent {
    Serial(SerialEvent),
    Server(ServerMessage),
    Input(LocalInput),
    ModelStroke(Result<StrokeDelta, ModelError>),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    /// What the local player is drawing right now.
    Scratch,
    PlayerBoard,
    ComputerBoard,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    Dot(PlayerDot),
    Line(LineSegment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Send(ClientMessage),
    WriteSerial(String),
    OpenSerial,
    SetStatus(String),
    Render(Surface, Shape),
    Clear(Surface),
    StartModel { word: String },
    RequestStroke,
    ShowInstructions(bool),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    /// Owns the hardware and draws. Every participant starts here until the
    /// coordinator says otherwise.
    Main,
    Spectator,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PenType {
    Small,
    Large,
}

impl PenType {
    fn next(self) -> Self {
        match self {
            PenType::Small => PenType::Large,
            PenType::Large => PenType::Small,
        }
    }

    fn size(self) -> f32 {
        match self {
            PenType::Small => PEN_SIZE / 2.0,
            PenType::Large => PEN_SIZE,
        }
    }
}

/// Game state of one browser tab.
pub struct Participant {
    state: GameState,
    role: Role,
    word_to_draw: String,
    pen_type: PenType,
    show_instructions: bool,
    serial_open: bool,
    computer_pen: ComputerPen,
    computer_done: bool,
    votes: VoteTally,
}

impl Participant {
    pub fn new() -> Self {
        Self {
            state: GameState::NewGame,
            role: Role::Main,
            word_to_draw: String::new(),
            pen_type: PenType::Small,
            show_instructions: true,
            serial_open: false,
            computer_pen: ComputerPen::new(),
            computer_done: false,
            votes: VoteTally::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn word_to_draw(&self) -> &str {
        &self.word_to_draw
    }

    pub fn votes(&self) -> VoteTally {
        self.votes
    }

    pub fn pen_type(&self) -> PenType {
        self.pen_type
    }

    pub fn is_serial_open(&self) -> bool {
        self.serial_open
    }

    pub fn handle(&mut self, event: ParticipantEvent) -> Vec<Effect> {
        let before = self.state;
        let effects = match event {
            ParticipantEvent::Serial(event) => self.handle_serial(event),
            ParticipantEvent::Server(message) => self.handle_server(message),
            ParticipantEvent::Input(input) => self.handle_input(input),
            ParticipantEvent::ModelStroke(stroke) => self.handle_model_stroke(stroke),
        };
        if before != self.state {
            log::info!("{:?} -> {:?}", before, self.state);
        }
        effects
    }

    fn handle_serial(&mut self, event: SerialEvent) -> Vec<Effect> {
        match event {
            SerialEvent::ConnectionOpened => {
                self.serial_open = true;
                vec![status("Serial connection opened successfully")]
            }
            SerialEvent::ConnectionClosed => {
                self.serial_open = false;
                vec![status("Serial connection closed")]
            }
            SerialEvent::ErrorOccurred(error) => {
                log::warn!("serial error: {}", error);
                vec![Effect::SetStatus(error)]
            }
            SerialEvent::DataReceived(line) => self.handle_serial_line(line.trim()),
        }
    }

    fn handle_serial_line(&mut self, line: &str) -> Vec<Effect> {
        if self.role == Role::Spectator {
            log::debug!("spectator ignores serial data {:?}", line);
            return Vec::new();
        }
        if line.is_empty() {
            return Vec::new();
        }
        match self.state {
            GameState::NewGame | GameState::Choose => {
                if line == CHOOSING_WORD {
                    self.state = GameState::Choose;
                    vec![status("Waiting for player to choose a word...")]
                } else {
                    self.state = GameState::PlayerDraw;
                    self.word_to_draw = line.to_owned();
                    vec![Effect::SetStatus(format!(
                        "Your word to draw is: {}",
                        self.word_to_draw
                    ))]
                }
            }
            state => {
                log::debug!("serial data {:?} ignored in {:?}", line, state);
                Vec::new()
            }
        }
    }

    fn handle_server(&mut self, message: ServerMessage) -> Vec<Effect> {
        match message {
            ServerMessage::WaitForVote => {
                self.role = Role::Spectator;
                vec![status("Waiting to vote until drawings are complete")]
            }
            ServerMessage::Vote => {
                if self.role == Role::Main || self.state == GameState::EndGame {
                    log::warn!("unexpected vote notice in {:?}", self.state);
                    return Vec::new();
                }
                self.state = GameState::Vote;
                vec![status("PLACE YOUR VOTE")]
            }
            ServerMessage::PlayerDrawData(dot) => {
                vec![Effect::Render(Surface::PlayerBoard, Shape::Dot(dot))]
            }
            ServerMessage::CompLineData(segment) => {
                vec![Effect::Render(Surface::ComputerBoard, Shape::Line(segment))]
            }
            ServerMessage::ClearPlayerDrawing => vec![Effect::Clear(Surface::PlayerBoard)],
            ServerMessage::PlayerVote => {
                self.votes.record(Choice::Player);
                self.write_serial("playerVote").into_iter().collect()
            }
            ServerMessage::ComputerVote => {
                self.votes.record(Choice::Computer);
                self.write_serial("computerVote").into_iter().collect()
            }
            ServerMessage::VotingDone(tally) => match self.state {
                GameState::Vote | GameState::Voted => {
                    if self.role == Role::Main && tally != self.votes {
                        log::warn!(
                            "local vote count {:?} differs from server {:?}",
                            self.votes,
                            tally
                        );
                    }
                    self.votes = tally;
                    self.state = GameState::EndGame;
                    vec![Effect::SetStatus(tally.outcome().to_string())]
                }
                state => {
                    log::warn!("voting done ignored in {:?}", state);
                    Vec::new()
                }
            },
            ServerMessage::Rejected { reason } => {
                log::warn!("server rejected command: {}", reason);
                Vec::new()
            }
        }
    }

    fn handle_input(&mut self, input: LocalInput) -> Vec<Effect> {
        match input {
            LocalInput::Key(key) => self.handle_key(key),
            LocalInput::PointerDrag { x, y } => {
                if self.state != GameState::PlayerDraw {
                    return Vec::new();
                }
                let dot = PlayerDot {
                    x_center: x,
                    y_center: y,
                    size: self.pen_type.size(),
                };
                vec![
                    Effect::Render(Surface::Scratch, Shape::Dot(dot)),
                    Effect::Send(ClientMessage::PlayerDrawData(dot)),
                ]
            }
            LocalInput::Finish => {
                if self.state != GameState::PlayerDraw {
                    return Vec::new();
                }
                self.state = GameState::ComputerDraw;
                self.computer_pen = ComputerPen::new();
                self.computer_done = false;

                let mut effects = vec![Effect::Clear(Surface::Scratch)];
                effects.extend(self.write_serial("ComputerDraw"));
                effects.push(status("Computer is drawing..."));
                effects.push(Effect::StartModel {
                    word: self.word_to_draw.clone(),
                });
                effects.push(Effect::RequestStroke);
                effects
            }
            LocalInput::BeginVoting => {
                if self.role != Role::Main
                    || self.state != GameState::ComputerDraw
                    || !self.computer_done
                {
                    return Vec::new();
                }
                self.state = GameState::Vote;
                self.votes = VoteTally::default();

                let mut effects = vec![
                    status("Counting votes..."),
                    Effect::Clear(Surface::Scratch),
                ];
                effects.extend(self.write_serial("Vote"));
                effects.push(Effect::Send(ClientMessage::Vote));
                effects
            }
            LocalInput::CastVote(choice) => {
                if self.role != Role::Spectator || self.state != GameState::Vote {
                    return Vec::new();
                }
                self.state = GameState::Voted;
                vec![
                    Effect::Send(ClientMessage::Voted { choice }),
                    status("Your vote has been placed!"),
                ]
            }
        }
    }

    fn handle_key(&mut self, key: char) -> Vec<Effect> {
        match key {
            'b' => {
                self.pen_type = self.pen_type.next();
                Vec::new()
            }
            'i' => {
                self.show_instructions = !self.show_instructions;
                vec![Effect::ShowInstructions(self.show_instructions)]
            }
            'l' if self.state == GameState::PlayerDraw => vec![
                Effect::Clear(Surface::Scratch),
                Effect::Send(ClientMessage::ClearPlayerDrawing),
            ],
            'o' if !self.serial_open && self.state == GameState::NewGame => {
                vec![Effect::OpenSerial]
            }
            _ => Vec::new(),
        }
    }

    fn handle_model_stroke(&mut self, stroke: Result<StrokeDelta, ModelError>) -> Vec<Effect> {
        if self.state != GameState::ComputerDraw || self.computer_done {
            log::debug!("stroke ignored in {:?}", self.state);
            return Vec::new();
        }
        let delta = match stroke {
            Ok(delta) => delta,
            Err(error) => {
                log::warn!("{}", error);
                self.computer_done = true;
                return vec![Effect::SetStatus(format!(
                    "Computer could not finish drawing: {}",
                    error.0
                ))];
            }
        };

        let mut effects = Vec::new();
        if let Some(segment) = self.computer_pen.advance(&delta) {
            effects.push(Effect::Render(Surface::Scratch, Shape::Line(segment)));
            effects.push(Effect::Send(ClientMessage::CompLineData(segment)));
        }
        if delta.pen == PenState::End {
            self.computer_done = true;
            effects.push(Effect::SetStatus(format!(
                "Computer drew a {}!",
                self.word_to_draw
            )));
        } else {
            effects.push(Effect::RequestStroke);
        }
        effects
    }

    fn write_serial(&self, token: &str) -> Option<Effect> {
        if self.serial_open {
            Some(Effect::WriteSerial(token.to_owned()))
        } else {
            None
        }
    }
}

impl std::default::Default for Participant {
    fn default() -> Self {
        Self::new()
    }
}

fn status(text: &str) -> Effect {
    Effect::SetStatus(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial_line(participant: &mut Participant, line: &str) -> Vec<Effect> {
        participant.handle(ParticipantEvent::Serial(SerialEvent::DataReceived(
            line.into(),
        )))
    }

    fn drawing_participant(word: &str) -> Participant {
        let mut participant = Participant::new();
        participant.handle(ParticipantEvent::Serial(SerialEvent::ConnectionOpened));
        serial_line(&mut participant, word);
        participant
    }

    fn input(participant: &mut Participant, input: LocalInput) -> Vec<Effect> {
        participant.handle(ParticipantEvent::Input(input))
    }

    fn stroke(participant: &mut Participant, dx: f32, dy: f32, pen: PenState) -> Vec<Effect> {
        participant.handle(ParticipantEvent::ModelStroke(Ok(StrokeDelta::new(
            dx, dy, pen,
        ))))
    }

    #[test]
    fn it_moves_from_choosing_to_drawing() {
        let mut participant = Participant::new();
        serial_line(&mut participant, "choosing word");
        assert_eq!(participant.state(), GameState::Choose);
        serial_line(&mut participant, "cat\r");
        assert_eq!(participant.state(), GameState::PlayerDraw);
        assert_eq!(participant.word_to_draw(), "cat");
    }

    #[test]
    fn it_accepts_word_directly_from_new_game() {
        let mut participant = Participant::new();
        let effects = serial_line(&mut participant, "house");
        assert_eq!(participant.state(), GameState::PlayerDraw);
        assert_eq!(
            effects,
            vec![Effect::SetStatus("Your word to draw is: house".into())]
        );
        serial_line(&mut participant, "choosing word");
        assert_eq!(participant.state(), GameState::PlayerDraw);
    }

    #[test]
    fn it_forwards_pen_samples_while_drawing() {
        let mut participant = Participant::new();
        assert!(input(&mut participant, LocalInput::PointerDrag { x: 1.0, y: 2.0 }).is_empty());

        serial_line(&mut participant, "cat");
        let dot = PlayerDot {
            x_center: 1.0,
            y_center: 2.0,
            size: 10.0,
        };
        assert_eq!(
            input(&mut participant, LocalInput::PointerDrag { x: 1.0, y: 2.0 }),
            vec![
                Effect::Render(Surface::Scratch, Shape::Dot(dot)),
                Effect::Send(ClientMessage::PlayerDrawData(dot)),
            ]
        );

        input(&mut participant, LocalInput::Key('b'));
        assert_eq!(participant.pen_type(), PenType::Large);
        let effects = input(&mut participant, LocalInput::PointerDrag { x: 1.0, y: 2.0 });
        assert_eq!(
            effects[1],
            Effect::Send(ClientMessage::PlayerDrawData(PlayerDot { size: 20.0, ..dot }))
        );
    }

    #[test]
    fn it_clears_only_while_drawing() {
        let mut participant = Participant::new();
        assert!(input(&mut participant, LocalInput::Key('l')).is_empty());
        serial_line(&mut participant, "cat");
        assert_eq!(
            input(&mut participant, LocalInput::Key('l')),
            vec![
                Effect::Clear(Surface::Scratch),
                Effect::Send(ClientMessage::ClearPlayerDrawing),
            ]
        );
    }

    #[test]
    fn it_opens_serial_only_from_new_game() {
        let mut participant = Participant::new();
        assert_eq!(
            input(&mut participant, LocalInput::Key('o')),
            vec![Effect::OpenSerial]
        );
        participant.handle(ParticipantEvent::Serial(SerialEvent::ConnectionOpened));
        assert!(input(&mut participant, LocalInput::Key('o')).is_empty());
    }

    #[test]
    fn it_reports_serial_errors_as_status() {
        let mut participant = Participant::new();
        let effects = participant.handle(ParticipantEvent::Serial(SerialEvent::ErrorOccurred(
            "port busy".into(),
        )));
        assert_eq!(effects, vec![Effect::SetStatus("port busy".into())]);
        assert!(!participant.is_serial_open());
    }

    #[test]
    fn it_starts_model_when_player_finishes() {
        let mut participant = drawing_participant("cat");
        let effects = input(&mut participant, LocalInput::Finish);
        assert_eq!(participant.state(), GameState::ComputerDraw);
        assert_eq!(
            effects,
            vec![
                Effect::Clear(Surface::Scratch),
                Effect::WriteSerial("ComputerDraw".into()),
                Effect::SetStatus("Computer is drawing...".into()),
                Effect::StartModel { word: "cat".into() },
                Effect::RequestStroke,
            ]
        );
    }

    #[test]
    fn it_skips_serial_write_when_port_closed() {
        let mut participant = Participant::new();
        serial_line(&mut participant, "cat");
        let effects = input(&mut participant, LocalInput::Finish);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::WriteSerial(_))));
    }

    #[test]
    fn it_requests_one_stroke_per_non_end_stroke() {
        let mut participant = drawing_participant("cat");
        input(&mut participant, LocalInput::Finish);

        let effects = stroke(&mut participant, 10.0, 0.0, PenState::Up);
        let segment = LineSegment {
            x1: 320.0,
            y1: 240.0,
            x2: 330.0,
            y2: 240.0,
        };
        assert_eq!(
            effects,
            vec![
                Effect::Render(Surface::Scratch, Shape::Line(segment)),
                Effect::Send(ClientMessage::CompLineData(segment)),
                Effect::RequestStroke,
            ]
        );

        // pen was up: nothing drawn, but the chain continues
        assert_eq!(
            stroke(&mut participant, 5.0, 5.0, PenState::Down),
            vec![Effect::RequestStroke]
        );

        let effects = stroke(&mut participant, 1.0, 1.0, PenState::End);
        assert!(!effects.contains(&Effect::RequestStroke));
        assert_eq!(
            effects.last(),
            Some(&Effect::SetStatus("Computer drew a cat!".into()))
        );
        assert!(stroke(&mut participant, 1.0, 1.0, PenState::Down).is_empty());
    }

    #[test]
    fn it_stops_chain_on_model_error() {
        let mut participant = drawing_participant("cat");
        input(&mut participant, LocalInput::Finish);
        let effects = participant.handle(ParticipantEvent::ModelStroke(Err(ModelError(
            "no model for cat".into(),
        ))));
        assert_eq!(
            effects,
            vec![Effect::SetStatus(
                "Computer could not finish drawing: no model for cat".into()
            )]
        );
        assert!(!input(&mut participant, LocalInput::BeginVoting).is_empty());
        assert_eq!(participant.state(), GameState::Vote);
    }

    #[test]
    fn it_waits_for_computer_before_voting() {
        let mut participant = drawing_participant("cat");
        input(&mut participant, LocalInput::Finish);
        assert!(input(&mut participant, LocalInput::BeginVoting).is_empty());
        stroke(&mut participant, 0.0, 0.0, PenState::End);

        let effects = input(&mut participant, LocalInput::BeginVoting);
        assert_eq!(participant.state(), GameState::Vote);
        assert!(effects.contains(&Effect::WriteSerial("Vote".into())));
        assert!(effects.contains(&Effect::Send(ClientMessage::Vote)));
    }

    #[test]
    fn it_lets_spectator_vote_once() {
        let mut participant = Participant::new();
        participant.handle(ParticipantEvent::Server(ServerMessage::WaitForVote));
        assert_eq!(participant.role(), Role::Spectator);
        assert!(serial_line(&mut participant, "cat").is_empty());
        assert!(input(&mut participant, LocalInput::CastVote(Choice::Player)).is_empty());

        participant.handle(ParticipantEvent::Server(ServerMessage::Vote));
        assert_eq!(participant.state(), GameState::Vote);
        let effects = input(&mut participant, LocalInput::CastVote(Choice::Computer));
        assert_eq!(
            effects[0],
            Effect::Send(ClientMessage::Voted {
                choice: Choice::Computer
            })
        );
        assert_eq!(participant.state(), GameState::Voted);
        assert!(input(&mut participant, LocalInput::CastVote(Choice::Player)).is_empty());
    }

    #[test]
    fn it_renders_relayed_strokes_on_shared_boards() {
        let mut participant = Participant::new();
        let dot = PlayerDot {
            x_center: 3.0,
            y_center: 4.0,
            size: 10.0,
        };
        assert_eq!(
            participant.handle(ParticipantEvent::Server(ServerMessage::PlayerDrawData(dot))),
            vec![Effect::Render(Surface::PlayerBoard, Shape::Dot(dot))]
        );
        assert_eq!(
            participant.handle(ParticipantEvent::Server(ServerMessage::ClearPlayerDrawing)),
            vec![Effect::Clear(Surface::PlayerBoard)]
        );
    }

    #[test]
    fn it_mirrors_votes_to_hardware_and_ends_game() {
        let mut participant = drawing_participant("cat");
        input(&mut participant, LocalInput::Finish);
        stroke(&mut participant, 0.0, 0.0, PenState::End);
        input(&mut participant, LocalInput::BeginVoting);

        assert_eq!(
            participant.handle(ParticipantEvent::Server(ServerMessage::PlayerVote)),
            vec![Effect::WriteSerial("playerVote".into())]
        );
        assert_eq!(
            participant.handle(ParticipantEvent::Server(ServerMessage::ComputerVote)),
            vec![Effect::WriteSerial("computerVote".into())]
        );
        let tally = participant.votes();
        let effects =
            participant.handle(ParticipantEvent::Server(ServerMessage::VotingDone(tally)));
        assert_eq!(participant.state(), GameState::EndGame);
        assert_eq!(effects, vec![Effect::SetStatus("It's a tie!".into())]);

        // terminal
        assert!(serial_line(&mut participant, "dog").is_empty());
        assert_eq!(participant.state(), GameState::EndGame);
    }
}
