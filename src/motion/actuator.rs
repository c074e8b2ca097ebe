// src/motion/actuator.rs - Stepper motor control
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::StepperConfig;

/// Minimum electrical width of a step pulse. Each pulse is atomic: the line
/// is raised, held, and dropped before the call returns.
const MIN_PULSE_WIDTH: Duration = Duration::from_micros(1);

/// Travel direction of a single actuator, in actuator-length space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    pub fn from_delta(delta: i64) -> Self {
        if delta < 0 { Direction::Reverse } else { Direction::Forward }
    }
}

/// Interface to one stepper motor: enable/disable and a single atomic step.
/// No knowledge of geometry.
pub trait StepperDriver {
    fn set_enabled(&mut self, enabled: bool);
    fn step(&mut self, direction: Direction);
}

/// Driver for a stepper wired to enable/dir/step lines by pin number.
/// The enable line is active-low, as on the A4988/DRV8825 family.
#[derive(Debug)]
pub struct GpioStepper {
    step_pin: u8,
    dir_pin: u8,
    enable_pin: u8,
    invert_direction: bool,
    dir_level: bool,
}

impl GpioStepper {
    pub fn new(config: &StepperConfig) -> Self {
        Self {
            step_pin: config.step_pin,
            dir_pin: config.dir_pin,
            enable_pin: config.enable_pin,
            invert_direction: config.invert_direction,
            dir_level: false,
        }
    }

    fn write_pin(&self, pin: u8, level: bool) {
        tracing::trace!(pin, level, "gpio write");
    }
}

impl StepperDriver for GpioStepper {
    fn set_enabled(&mut self, enabled: bool) {
        self.write_pin(self.enable_pin, !enabled);
    }

    fn step(&mut self, direction: Direction) {
        let level = match direction {
            Direction::Forward => !self.invert_direction,
            Direction::Reverse => self.invert_direction,
        };
        if level != self.dir_level {
            self.write_pin(self.dir_pin, level);
            self.dir_level = level;
        }
        self.write_pin(self.step_pin, true);
        std::thread::sleep(MIN_PULSE_WIDTH);
        self.write_pin(self.step_pin, false);
    }
}

/// Driver that records every pulse instead of toggling pins. Used for
/// host-side dry runs and tests.
#[derive(Debug, Default)]
pub struct SimStepper {
    pulses: Arc<Mutex<Vec<Direction>>>,
}

impl SimStepper {
    pub fn new() -> (Self, Arc<Mutex<Vec<Direction>>>) {
        let pulses = Arc::new(Mutex::new(Vec::new()));
        (Self { pulses: pulses.clone() }, pulses)
    }
}

impl StepperDriver for SimStepper {
    fn set_enabled(&mut self, _enabled: bool) {}

    fn step(&mut self, direction: Direction) {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(direction);
        }
    }
}

/// A stepper motor plus its physical conversion constant, with a step
/// counter guarded to the actuator's travel range.
pub struct ActuatorAssembly {
    name: String,
    driver: Box<dyn StepperDriver>,
    mm_per_step: f64,
    position_steps: i64,
    max_steps: i64,
}

impl ActuatorAssembly {
    pub fn new(
        name: impl Into<String>,
        driver: Box<dyn StepperDriver>,
        config: &StepperConfig,
        max_length_mm: f64,
    ) -> Self {
        let mm_per_step = config.mm_per_step();
        Self {
            name: name.into(),
            driver,
            mm_per_step,
            position_steps: 0,
            max_steps: (max_length_mm / mm_per_step).ceil() as i64,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mm_per_step(&self) -> f64 {
        self.mm_per_step
    }

    /// Whole steps covering a signed length delta, fractional remainder
    /// discarded.
    pub fn steps_for(&self, delta_mm: f64) -> i64 {
        let steps = (delta_mm.abs() / self.mm_per_step).floor() as i64;
        if delta_mm < 0.0 { -steps } else { steps }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.driver.set_enabled(enabled);
    }

    /// Take a single step, refusing to leave the travel range. Returns
    /// whether a pulse was actually emitted.
    pub fn step(&mut self, direction: Direction) -> bool {
        let next = self.position_steps + direction.sign();
        if next < 0 || next > self.max_steps {
            return false;
        }
        self.position_steps = next;
        self.driver.step(direction);
        true
    }

    /// Emit a pulse without counting it: backlash take-up. The logical
    /// position does not move.
    pub fn take_up(&mut self, direction: Direction) {
        self.driver.step(direction);
    }

    /// Reseed the step counter from a known actuator length.
    pub fn set_position_mm(&mut self, length_mm: f64) {
        self.position_steps = (length_mm / self.mm_per_step).round() as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StepperConfig {
        StepperConfig {
            step_pin: 4,
            dir_pin: 2,
            enable_pin: 0,
            rotation_distance: 200.0,
            microsteps: 1,
            full_steps_per_rotation: 200,
            invert_direction: false,
        }
    }

    fn assembly(max_length_mm: f64) -> (ActuatorAssembly, Arc<Mutex<Vec<Direction>>>) {
        let (driver, pulses) = SimStepper::new();
        let assembly =
            ActuatorAssembly::new("left", Box::new(driver), &test_config(), max_length_mm);
        (assembly, pulses)
    }

    #[test]
    fn test_steps_for_discards_fraction() {
        let (assembly, _) = assembly(100.0);
        // 1 mm per step with the test config
        assert_eq!(assembly.steps_for(2.9), 2);
        assert_eq!(assembly.steps_for(-2.9), -2);
        assert_eq!(assembly.steps_for(0.4), 0);
    }

    #[test]
    fn test_step_guards_travel_range() {
        let (mut assembly, pulses) = assembly(2.0);
        assert!(!assembly.step(Direction::Reverse)); // already at 0
        assert!(assembly.step(Direction::Forward));
        assert!(assembly.step(Direction::Forward));
        assert!(!assembly.step(Direction::Forward)); // at max
        assert_eq!(pulses.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_take_up_does_not_move_position() {
        let (mut assembly, pulses) = assembly(10.0);
        assembly.step(Direction::Forward);
        assembly.take_up(Direction::Reverse);
        assembly.take_up(Direction::Reverse);
        // Pulses were emitted but the counter still allows stepping back once.
        assert_eq!(pulses.lock().unwrap().len(), 3);
        assert!(assembly.step(Direction::Reverse));
        assert!(!assembly.step(Direction::Reverse));
    }
}
