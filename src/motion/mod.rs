// src/motion/mod.rs
pub mod actuator;
pub mod device;
pub mod interpolator;
pub mod kinematics;

pub use actuator::{ActuatorAssembly, Direction, GpioStepper, SimStepper, StepperDriver};
pub use device::{Device, DeviceState};
pub use interpolator::{BacklashCompensator, Interpolator};
pub use kinematics::{Kinematics, create_kinematics};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("target ({x}, {y}) outside travel bounds ({max_x}, {max_y})")]
    OutOfBounds { x: f64, y: f64, max_x: f64, max_y: f64 },
    #[error("motion already in progress")]
    Busy,
    #[error("unknown actuator: {0}")]
    UnknownActuator(String),
}
