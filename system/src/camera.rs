//! Serial-driven camera for the 3D box demo. The device sends `x,y` lines
//! with both values normalized to `[0, 1]`.

use crate::participant::SerialEvent;
use euclid::default::{Point2D, Point3D, Vector3D};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CAMERA_RANGE: f32 = 400.0;
const CAMERA_HEIGHT: f32 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("expected `x,y` but got {0:?}")]
    MissingComponent(String),
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("expected two values but got {0:?}")]
    ExtraComponent(String),
    #[error("{0:?} is not finite")]
    NotFinite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Point3D<f32>,
    pub center: Point3D<f32>,
    pub up: Vector3D<f32>,
}

pub fn parse_position(line: &str) -> Result<Point2D<f32>, CameraError> {
    let mut parts = line.trim().split(',');
    let mut component = || -> Result<f32, CameraError> {
        let raw = parts
            .next()
            .ok_or_else(|| CameraError::MissingComponent(line.to_owned()))?
            .trim();
        let value = raw
            .parse::<f32>()
            .map_err(|_| CameraError::NotANumber(raw.to_owned()))?;
        if !value.is_finite() {
            return Err(CameraError::NotFinite(raw.to_owned()));
        }
        Ok(value)
    };
    let x = component()?;
    let y = component()?;
    if parts.next().is_some() {
        return Err(CameraError::ExtraComponent(line.to_owned()));
    }
    Ok(Point2D::new(x, y))
}

/// Linear map from `[0, 1]` to `[-CAMERA_RANGE, CAMERA_RANGE]`. Not clamped.
fn to_camera_space(value: f32) -> f32 {
    -CAMERA_RANGE + value * 2.0 * CAMERA_RANGE
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Point2D<f32>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            position: Point2D::new(0.0, 0.0),
        }
    }

    pub fn position(&self) -> Point2D<f32> {
        self.position
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: Point3D::new(
                to_camera_space(self.position.x),
                to_camera_space(self.position.y),
                CAMERA_HEIGHT,
            ),
            center: Point3D::origin(),
            up: Vector3D::new(0.0, 1.0, 0.0),
        }
    }

    /// Applies a serial event and returns the status line to show.
    pub fn handle(&mut self, event: SerialEvent) -> String {
        match event {
            SerialEvent::ConnectionOpened => "Serial connection opened successfully".into(),
            SerialEvent::ConnectionClosed => "Serial connection closed".into(),
            SerialEvent::ErrorOccurred(error) => error,
            SerialEvent::DataReceived(line) => match parse_position(&line) {
                Ok(position) => {
                    self.position = position;
                    format!("onSerialDataReceived: {}", line.trim())
                }
                Err(error) => {
                    log::warn!("{}", error);
                    error.to_string()
                }
            },
        }
    }
}

impl std::default::Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}
