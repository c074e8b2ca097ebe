// src/config/mod.rs - Plotter configuration
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

/// Main configuration structure, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plotter: PlotterConfig,

    /// Geometry constants for the suspended-sled variant. Required when
    /// `plotter.geometry` is `"trapezoidal"`.
    #[serde(default)]
    pub trapezoid: Option<TrapezoidConfig>,

    #[serde(default)]
    pub steppers: HashMap<String, StepperConfig>,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub web: WebConfig,
}

/// Plotter base configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlotterConfig {
    #[serde(default)]
    pub plotter_name: Option<String>,

    #[serde(default = "default_geometry")]
    pub geometry: String,

    #[serde(default = "default_travel_x")]
    pub travel_x: f64,

    #[serde(default = "default_travel_y")]
    pub travel_y: f64,

    /// Fixed delay between interpolator ticks. Motion is constant-rate; the
    /// G-code feed rate never modulates this.
    #[serde(default = "default_interstep_delay_ms")]
    pub interstep_delay_ms: u64,

    /// Take-up pulses emitted on axis direction reversal.
    #[serde(default)]
    pub backlash_steps: u32,

    #[serde(default = "default_pen_up_z")]
    pub pen_up_z: f64,

    #[serde(default = "default_pen_down_z")]
    pub pen_down_z: f64,

    /// Back-off distance after driving into the physical stops while homing.
    #[serde(default = "default_home_margin_mm")]
    pub home_margin_mm: f64,
}

/// Geometry constants for the trapezoidal (two-belt suspended sled) variant.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TrapezoidConfig {
    #[serde(default = "default_upper_base")]
    pub upper_base: f64,

    #[serde(default = "default_implement_offset_x")]
    pub implement_offset_x: f64,

    #[serde(default = "default_implement_offset_y")]
    pub implement_offset_y: f64,

    /// Frame-clearance margins. Must be at least the implement offsets so
    /// that belt lengths stay monotonic over the travel rectangle.
    #[serde(default = "default_keepout")]
    pub keepout_x: f64,

    #[serde(default = "default_keepout")]
    pub keepout_y: f64,
}

/// Stepper motor configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StepperConfig {
    pub step_pin: u8,
    pub dir_pin: u8,
    pub enable_pin: u8,

    /// Linear distance per pulley revolution, in mm.
    #[serde(default = "default_rotation_distance")]
    pub rotation_distance: f64,

    #[serde(default = "default_microsteps")]
    pub microsteps: u32,

    #[serde(default = "default_full_steps_per_rotation")]
    pub full_steps_per_rotation: u32,

    #[serde(default)]
    pub invert_direction: bool,
}

/// Position snapshot persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

/// Web interface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_web_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// Default value functions
fn default_geometry() -> String { "orthogonal".to_string() }
fn default_travel_x() -> f64 { 438.0 }
fn default_travel_y() -> f64 { 485.0 }
fn default_interstep_delay_ms() -> u64 { 3 }
fn default_pen_up_z() -> f64 { 1.0 }
fn default_pen_down_z() -> f64 { -1.0 }
fn default_home_margin_mm() -> f64 { 20.0 }
fn default_upper_base() -> f64 { 649.0 }
fn default_implement_offset_x() -> f64 { 11.5 }
fn default_implement_offset_y() -> f64 { 20.0 }
fn default_keepout() -> f64 { 40.0 }
fn default_rotation_distance() -> f64 { 40.0 }
fn default_microsteps() -> u32 { 16 }
fn default_full_steps_per_rotation() -> u32 { 200 }
fn default_snapshot_path() -> String { "position.json".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_bind_address() -> String { "0.0.0.0".to_string() }

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            plotter_name: None,
            geometry: default_geometry(),
            travel_x: default_travel_x(),
            travel_y: default_travel_y(),
            interstep_delay_ms: default_interstep_delay_ms(),
            backlash_steps: 0,
            pen_up_z: default_pen_up_z(),
            pen_down_z: default_pen_down_z(),
            home_margin_mm: default_home_margin_mm(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { path: default_snapshot_path() }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { port: default_web_port(), bind_address: default_bind_address() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plotter: PlotterConfig::default(),
            trapezoid: None,
            steppers: HashMap::new(),
            persistence: PersistenceConfig::default(),
            web: WebConfig::default(),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(config_path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let mut file = File::open(config_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    tracing::info!("Loaded configuration from: {}", config_path);
    Ok(config)
}

impl Config {
    /// Names of the steppers the configured geometry expects, in axis order.
    pub fn expected_steppers(&self) -> [&'static str; 2] {
        match self.plotter.geometry.as_str() {
            "trapezoidal" => ["left", "right"],
            _ => ["x", "y"],
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.plotter.travel_x <= 0.0 || self.plotter.travel_y <= 0.0 {
            return Err("travel_x and travel_y must be positive".into());
        }

        match self.plotter.geometry.as_str() {
            "orthogonal" => {}
            "trapezoidal" => {
                let trapezoid = self
                    .trapezoid
                    .as_ref()
                    .ok_or("geometry is trapezoidal but [trapezoid] section is missing")?;

                if trapezoid.upper_base <= 0.0 {
                    return Err("trapezoid upper_base must be positive".into());
                }
                // Belt lengths are only monotonic across the travel rectangle
                // when the keepout margins cover the implement offsets.
                if trapezoid.keepout_x < trapezoid.implement_offset_x {
                    return Err("trapezoid keepout_x must be >= implement_offset_x".into());
                }
                if trapezoid.keepout_y < trapezoid.implement_offset_y {
                    return Err("trapezoid keepout_y must be >= implement_offset_y".into());
                }
            }
            other => {
                return Err(format!("unknown geometry: {}", other).into());
            }
        }

        for name in self.expected_steppers() {
            let stepper = self
                .steppers
                .get(name)
                .ok_or_else(|| format!("missing [steppers.{}] section", name))?;

            if stepper.rotation_distance <= 0.0 {
                return Err(format!("stepper {} rotation_distance must be positive", name).into());
            }
            if stepper.microsteps == 0 || stepper.full_steps_per_rotation == 0 {
                return Err(format!(
                    "stepper {} microsteps and full_steps_per_rotation must be positive",
                    name
                )
                .into());
            }
        }

        Ok(())
    }
}

impl StepperConfig {
    /// Steps per mm of linear travel.
    pub fn steps_per_mm(&self) -> f64 {
        self.full_steps_per_rotation as f64 * self.microsteps as f64 / self.rotation_distance
    }

    /// Linear distance per single step, in mm.
    pub fn mm_per_step(&self) -> f64 {
        self.rotation_distance / (self.full_steps_per_rotation as f64 * self.microsteps as f64)
    }
}
