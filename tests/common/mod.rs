// Shared helpers for the integration tests: a simulated two-axis device
// with 1 mm per step and a temp-dir snapshot path.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use scrawl::config::{Config, StepperConfig, TrapezoidConfig};
use scrawl::motion::{Device, Direction, SimStepper, StepperDriver};

pub fn test_stepper() -> StepperConfig {
    StepperConfig {
        step_pin: 1,
        dir_pin: 2,
        enable_pin: 3,
        rotation_distance: 200.0,
        microsteps: 1,
        full_steps_per_rotation: 200,
        invert_direction: false,
    }
}

pub fn orthogonal_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.plotter.travel_x = 200.0;
    config.plotter.travel_y = 200.0;
    config.plotter.interstep_delay_ms = 0;
    config.persistence.path = dir
        .path()
        .join("position.json")
        .to_string_lossy()
        .into_owned();
    for name in ["x", "y"] {
        config.steppers.insert(name.to_string(), test_stepper());
    }
    config
}

pub fn trapezoidal_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.plotter.geometry = "trapezoidal".to_string();
    config.plotter.travel_x = 438.0;
    config.plotter.travel_y = 485.0;
    config.plotter.interstep_delay_ms = 0;
    config.trapezoid = Some(TrapezoidConfig {
        upper_base: 649.0,
        implement_offset_x: 11.5,
        implement_offset_y: 20.0,
        keepout_x: 40.0,
        keepout_y: 40.0,
    });
    config.persistence.path = dir
        .path()
        .join("position.json")
        .to_string_lossy()
        .into_owned();
    for name in ["left", "right"] {
        config.steppers.insert(name.to_string(), test_stepper());
    }
    config
}

pub fn sim_device(config: &Config) -> (Device, Vec<Arc<Mutex<Vec<Direction>>>>) {
    let mut drivers: Vec<Box<dyn StepperDriver>> = Vec::new();
    let mut logs = Vec::new();
    for _ in 0..2 {
        let (driver, pulses) = SimStepper::new();
        drivers.push(Box::new(driver));
        logs.push(pulses);
    }
    (Device::with_drivers(config, drivers).unwrap(), logs)
}

pub fn pulse_count(log: &Arc<Mutex<Vec<Direction>>>) -> usize {
    log.lock().unwrap().len()
}
