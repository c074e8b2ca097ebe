//! Communication channel messages between the web server and the plotter task.

use serde::Serialize;
use tokio::sync::oneshot;

use crate::gcode::GCodeError;
use crate::motion::MotionError;
use crate::plotter::PlotterError;
use crate::queue::DrawEvent;
use crate::svg::{SvgError, SvgToken};
use crate::web::models::StatusResponse;

/// A request sent from a web handler to the plotter task.
#[derive(Debug)]
pub enum PlotterRequest {
    GetStatus {
        respond_to: oneshot::Sender<StatusResponse>,
    },
    MoveTo {
        x: f64,
        y: f64,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    MoveZ {
        z: f64,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    Home {
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    Jog {
        actuator: String,
        direction: String,
        steps: u32,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    ExecuteGcode {
        program: String,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    RenderSvg {
        tokens: Vec<SvgToken>,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    Write {
        text: String,
        char_height: f64,
        char_spacing: Option<f64>,
        word_spacing: Option<f64>,
        x_offset: Option<f64>,
        y_offset: Option<f64>,
        respond_to: oneshot::Sender<Result<(), RequestError>>,
    },
    /// Fire-and-forget producer side of the draw queue.
    EnqueueDraw { event: DrawEvent },
}

/// Wire-friendly error classification, so the handlers can pick status
/// codes without carrying the full error types across the channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RequestError {
    /// Motion already in progress; the caller should retry.
    Busy,
    OutOfBounds(String),
    CouldNotParse(String),
    Precondition(String),
    BadRequest(String),
}

impl From<PlotterError> for RequestError {
    fn from(error: PlotterError) -> Self {
        match error {
            PlotterError::Motion(e) => e.into(),
            PlotterError::GCode(GCodeError::Motion(e)) => e.into(),
            PlotterError::GCode(e @ GCodeError::Precondition(_)) => {
                RequestError::Precondition(e.to_string())
            }
            PlotterError::Svg(SvgError::Motion(e)) => e.into(),
            PlotterError::Svg(e @ SvgError::CouldNotParse(_)) => {
                RequestError::CouldNotParse(e.to_string())
            }
        }
    }
}

impl From<MotionError> for RequestError {
    fn from(error: MotionError) -> Self {
        match error {
            MotionError::Busy => RequestError::Busy,
            e @ MotionError::OutOfBounds { .. } => RequestError::OutOfBounds(e.to_string()),
            e @ MotionError::UnknownActuator(_) => RequestError::BadRequest(e.to_string()),
        }
    }
}
