//! Request and response bodies for the web API.

use serde::{Deserialize, Serialize};

use crate::queue::DrawEventKind;

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub current_position: Position,
    pub max_position: TravelLimits,
    pub moving: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TravelLimits {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct MoveZRequest {
    pub z: f64,
}

#[derive(Debug, Deserialize)]
pub struct JogRequest {
    pub actuator: String,
    pub direction: String,
    pub steps: u32,
}

#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub text: String,
    #[serde(default = "default_char_height")]
    pub char_height: f64,
    #[serde(default)]
    pub char_spacing: Option<f64>,
    #[serde(default)]
    pub word_spacing: Option<f64>,
    #[serde(default)]
    pub x_offset: Option<f64>,
    #[serde(default)]
    pub y_offset: Option<f64>,
}

fn default_char_height() -> f64 {
    10.0
}

/// One websocket frame on the interactive draw feed.
#[derive(Debug, Deserialize)]
pub struct DrawMessage {
    pub event: DrawEventKind,
    pub x: f64,
    pub y: f64,
}
