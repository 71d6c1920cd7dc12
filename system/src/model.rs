use crate::participant::{Effect, Participant, ParticipantEvent};
use crate::{LineSegment, PenState, StrokeDelta, CANVAS_HEIGHT, CANVAS_WIDTH};
use euclid::default::{Point2D, Vector2D};
use std::cell::RefCell;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("drawing model failed: {0}")]
pub struct ModelError(pub String);

/// A generative drawing model, e.g. SketchRNN loaded for one word.
#[allow(async_fn_in_trait)]
pub trait StrokeModel {
    /// Forget the strokes produced so far.
    fn reset(&mut self);

    async fn generate(&mut self) -> Result<StrokeDelta, ModelError>;
}

/// Pen of the computer player. Positions are absolute canvas coordinates.
#[derive(Debug, Clone)]
pub struct ComputerPen {
    position: Point2D<f32>,
    previous_pen: PenState,
}

impl ComputerPen {
    pub fn new() -> Self {
        Self {
            position: Point2D::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            previous_pen: PenState::Down,
        }
    }

    pub fn position(&self) -> Point2D<f32> {
        self.position
    }

    /// Moves the pen and returns the segment to draw, if the pen was down
    /// before this movement.
    pub fn advance(&mut self, delta: &StrokeDelta) -> Option<LineSegment> {
        let from = self.position;
        let to = from + Vector2D::new(delta.dx, delta.dy);
        self.position = to;
        let was_down = self.previous_pen == PenState::Down;
        self.previous_pen = delta.pen;
        if was_down {
            Some(LineSegment {
                x1: from.x,
                y1: from.y,
                x2: to.x,
                y2: to.y,
            })
        } else {
            None
        }
    }
}

impl std::default::Default for ComputerPen {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the computer's turn: asks the model for strokes one at a time and
/// feeds each into the participant, until the participant stops asking.
///
/// The participant is only borrowed between suspension points, so other
/// events may be handled while the model is busy.
pub async fn drive_model<M, F>(model: &mut M, participant: &RefCell<Participant>, mut sink: F)
where
    M: StrokeModel,
    F: FnMut(Vec<Effect>),
{
    model.reset();
    loop {
        let stroke = model.generate().await;
        let effects = participant
            .borrow_mut()
            .handle(ParticipantEvent::ModelStroke(stroke));
        let (requests, effects): (Vec<Effect>, Vec<Effect>) = effects
            .into_iter()
            .partition(|effect| *effect == Effect::RequestStroke);
        sink(effects);
        if requests.is_empty() {
            break;
        }
    }
    log::debug!("model driver finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_starts_at_canvas_center_with_pen_down() {
        let mut pen = ComputerPen::new();
        let segment = pen
            .advance(&StrokeDelta::new(5.0, -5.0, PenState::Up))
            .expect("first stroke is drawn");
        assert_eq!(
            segment,
            LineSegment {
                x1: 320.0,
                y1: 240.0,
                x2: 325.0,
                y2: 235.0
            }
        );
    }

    #[test]
    fn it_uses_previous_pen_state() {
        let mut pen = ComputerPen::new();
        pen.advance(&StrokeDelta::new(1.0, 1.0, PenState::Up));
        assert!(pen
            .advance(&StrokeDelta::new(1.0, 1.0, PenState::Down))
            .is_none());
        assert!(pen
            .advance(&StrokeDelta::new(1.0, 1.0, PenState::End))
            .is_some());
        assert_eq!(pen.position(), Point2D::new(323.0, 243.0));
    }
}
