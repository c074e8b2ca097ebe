// src/plotter.rs - Top-level plotter aggregate
use thiserror::Error;

use crate::config::Config;
use crate::gcode::{GCodeError, GCodeExecutor};
use crate::motion::{Device, DeviceState, Direction, MotionError};
use crate::queue::{DrawEvent, DrawEventKind, DrawQueue};
use crate::svg::{SvgError, SvgToken, render_svg};
use crate::text::{TextOptions, draw_text};

#[derive(Debug, Error)]
pub enum PlotterError {
    #[error("motion error: {0}")]
    Motion(#[from] MotionError),
    #[error("g-code error: {0}")]
    GCode(#[from] GCodeError),
    #[error("svg error: {0}")]
    Svg(#[from] SvgError),
}

/// Owns the device and the interactive draw queue; everything the host's
/// request layer can ask for goes through here.
pub struct Plotter {
    config: Config,
    device: Device,
    draw_queue: DrawQueue,
}

impl Plotter {
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let device = Device::new(&config)?;
        Ok(Self { config, device, draw_queue: DrawQueue::new() })
    }

    /// Build a plotter around an externally constructed device. Used by
    /// tests with `SimStepper` drivers.
    pub fn with_device(config: Config, device: Device) -> Self {
        Self { config, device, draw_queue: DrawQueue::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        self.device.state()
    }

    pub fn travel(&self) -> (f64, f64) {
        self.device.travel()
    }

    pub async fn move_xy(&mut self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.device.move_xy(x, y).await.map_err(PlotterError::from)
    }

    pub async fn move_z(&mut self, z: f64) -> Result<(), PlotterError> {
        self.device.move_z(z).await.map_err(PlotterError::from)
    }

    pub async fn home(&mut self) -> Result<(), PlotterError> {
        self.device.home().await.map_err(PlotterError::from)
    }

    pub async fn jog(
        &mut self,
        actuator: &str,
        direction: Direction,
        steps: u32,
    ) -> Result<(), PlotterError> {
        self.device
            .jog(actuator, direction, steps)
            .await
            .map_err(PlotterError::from)
    }

    /// Decode and apply a whole G-code program as one motion operation.
    /// Units and distance mode start unset on every program.
    pub async fn execute_gcode(&mut self, program: &str) -> Result<(), PlotterError> {
        let mut executor = GCodeExecutor::new();
        executor
            .run(&mut self.device, program)
            .await
            .map_err(PlotterError::from)
    }

    pub async fn render_svg(
        &mut self,
        tokens: impl IntoIterator<Item = SvgToken>,
    ) -> Result<(), PlotterError> {
        render_svg(&mut self.device, tokens)
            .await
            .map_err(PlotterError::from)
    }

    pub async fn draw_text(
        &mut self,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), PlotterError> {
        draw_text(&mut self.device, text, options)
            .await
            .map_err(PlotterError::from)
    }

    /// Non-blocking producer side of the draw stream.
    pub fn enqueue_draw(&mut self, event: DrawEvent) {
        self.draw_queue.push(event);
    }

    pub fn draw_queue_len(&self) -> usize {
        self.draw_queue.len()
    }

    /// Cooperative draw tick: when idle, pop one queued event and run it to
    /// completion. Called from the host's interval timer; errors from the
    /// interactive stream are logged and dropped, never fatal.
    pub async fn tick_draw(&mut self) {
        if self.device.state().moving || self.draw_queue.is_empty() {
            return;
        }
        let Some(event) = self.draw_queue.pop() else {
            return;
        };

        let z = match event.kind {
            DrawEventKind::Draw => self.config.plotter.pen_down_z,
            DrawEventKind::Lift => self.config.plotter.pen_up_z,
        };
        if let Err(e) = self.device.move_z(z).await {
            tracing::warn!("draw tick: pen move failed: {}", e);
            return;
        }
        if let Err(e) = self.device.move_xy(event.x, event.y).await {
            tracing::warn!("draw tick: move to ({}, {}) failed: {}", event.x, event.y, e);
        }
    }
}
