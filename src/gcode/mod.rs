// src/gcode/mod.rs - G-code execution against the motion engine
pub mod parser;

pub use parser::{GCodeCommand, decode};

use thiserror::Error;

use crate::motion::{Device, MotionError};

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Error)]
pub enum GCodeError {
    #[error("motion command before {0} established")]
    Precondition(&'static str),
    #[error(transparent)]
    Motion(#[from] MotionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Units {
    Inches,
    Millimeters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Absolute,
    Incremental,
}

/// Consumes a decoded command stream, tracking units and distance mode as
/// running state. Both default to unset: motion commands before `G20`/`G21`
/// and `G90`/`G91` are a precondition error, not a silent default.
pub struct GCodeExecutor {
    units: Option<Units>,
    mode: Option<Mode>,
}

impl GCodeExecutor {
    pub fn new() -> Self {
        Self { units: None, mode: None }
    }

    /// Run a whole program as a single locked motion operation.
    pub async fn run(&mut self, device: &mut Device, program: &str) -> Result<(), GCodeError> {
        device.begin_motion().map_err(GCodeError::Motion)?;
        let result = self.run_unlocked(device, program).await;
        device.finish_motion();
        result
    }

    async fn run_unlocked(&mut self, device: &mut Device, program: &str) -> Result<(), GCodeError> {
        for line in program.lines() {
            match decode(line) {
                GCodeCommand::Empty => {}
                GCodeCommand::Comment(text) => {
                    tracing::debug!("g-code comment: {}", text);
                }
                GCodeCommand::UnitsInches => self.units = Some(Units::Inches),
                GCodeCommand::UnitsMillimeters => self.units = Some(Units::Millimeters),
                GCodeCommand::AbsoluteMode => self.mode = Some(Mode::Absolute),
                GCodeCommand::IncrementalMode => self.mode = Some(Mode::Incremental),
                GCodeCommand::RapidPositioning { x, y } => {
                    let (x, y) = self.resolve_xy(device, Some(x), Some(y))?;
                    device.move_xy_unlocked(x, y).await?;
                }
                GCodeCommand::LinearInterpolation { x, y, z, feed_rate } => {
                    if let Some(feed_rate) = feed_rate {
                        // Accepted but never applied: step rate is a device
                        // constant.
                        tracing::trace!("ignoring feed rate {}", feed_rate);
                    }
                    if x.is_some() || y.is_some() {
                        let (x, y) = self.resolve_xy(device, x, y)?;
                        device.move_xy_unlocked(x, y).await?;
                    }
                    if let Some(z) = z {
                        let z = self.resolve_z(device, z)?;
                        device.move_z_unlocked(z);
                    }
                }
                GCodeCommand::Unsupported => {
                    tracing::warn!("skipping unsupported g-code line: {}", line.trim());
                }
            }
        }
        Ok(())
    }

    fn require_state(&self) -> Result<(Units, Mode), GCodeError> {
        let units = self.units.ok_or(GCodeError::Precondition("units"))?;
        let mode = self.mode.ok_or(GCodeError::Precondition("distance mode"))?;
        Ok((units, mode))
    }

    fn resolve_xy(
        &self,
        device: &Device,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<(f64, f64), GCodeError> {
        let (units, mode) = self.require_state()?;
        let state = device.state();
        let resolved = |value: Option<f64>, current: f64| match mode {
            // Absent coordinate: unchanged in absolute mode, zero delta in
            // incremental mode - the same thing.
            Mode::Absolute => value.map_or(current, |v| to_mm(v, units)),
            Mode::Incremental => current + value.map_or(0.0, |v| to_mm(v, units)),
        };
        Ok((resolved(x, state.x), resolved(y, state.y)))
    }

    fn resolve_z(&self, device: &Device, z: f64) -> Result<f64, GCodeError> {
        let (units, mode) = self.require_state()?;
        Ok(match mode {
            Mode::Absolute => to_mm(z, units),
            Mode::Incremental => device.state().z + to_mm(z, units),
        })
    }
}

impl Default for GCodeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn to_mm(value: f64, units: Units) -> f64 {
    match units {
        Units::Millimeters => value,
        Units::Inches => value * MM_PER_INCH,
    }
}
