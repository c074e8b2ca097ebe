// src/motion/device.rs - Motion lock, device state, and the public motion ops
use std::time::Duration;

use crate::config::Config;
use crate::motion::MotionError;
use crate::motion::actuator::{ActuatorAssembly, Direction, GpioStepper, StepperDriver};
use crate::motion::interpolator::{BacklashCompensator, Interpolator};
use crate::motion::kinematics::{Kinematics, create_kinematics};
use crate::persistence::{PersistedSnapshot, SnapshotStore};

/// The authoritative in-memory position. Mutated only through the guarded
/// motion operations; persisted after each completed or failed move.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub x: f64,
    pub y: f64,
    /// Pen lift indicator: non-negative means lifted.
    pub z: f64,
    /// Derived actuator lengths, in axis order.
    pub lengths: [f64; 2],
    pub moving: bool,
}

/// The device aggregate: actuator handles, kinematics, motion lock, and
/// snapshot store. All operations take exclusive access.
pub struct Device {
    kinematics: Box<dyn Kinematics>,
    axes: Vec<ActuatorAssembly>,
    interpolator: Interpolator,
    backlash: BacklashCompensator,
    state: DeviceState,
    store: SnapshotStore,
    travel: (f64, f64),
    home_margin: f64,
    interstep_delay: Duration,
}

impl Device {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let mut drivers: Vec<Box<dyn StepperDriver>> = Vec::new();
        for name in config.expected_steppers() {
            let stepper = config
                .steppers
                .get(name)
                .ok_or_else(|| format!("missing [steppers.{}] section", name))?;
            drivers.push(Box::new(GpioStepper::new(stepper)));
        }
        Self::with_drivers(config, drivers)
    }

    /// Build a device with caller-supplied drivers. Used by tests and
    /// host-side dry runs with `SimStepper`.
    pub fn with_drivers(
        config: &Config,
        drivers: Vec<Box<dyn StepperDriver>>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let kinematics = create_kinematics(config);
        let travel = (config.plotter.travel_x, config.plotter.travel_y);

        // The longest each actuator can get anywhere in the travel
        // rectangle bounds its step counter.
        let corners = [
            (0.0, 0.0),
            (travel.0, 0.0),
            (0.0, travel.1),
            (travel.0, travel.1),
        ];
        let mut max_lengths = [0.0f64; 2];
        for (x, y) in corners {
            let lengths = kinematics.lengths(x, y);
            max_lengths[0] = max_lengths[0].max(lengths[0]);
            max_lengths[1] = max_lengths[1].max(lengths[1]);
        }

        let mut axes = Vec::new();
        for (i, (name, driver)) in config
            .expected_steppers()
            .into_iter()
            .zip(drivers)
            .enumerate()
        {
            let stepper = config
                .steppers
                .get(name)
                .ok_or_else(|| format!("missing [steppers.{}] section", name))?;
            axes.push(ActuatorAssembly::new(name, driver, stepper, max_lengths[i]));
        }

        let store = SnapshotStore::new(&config.persistence.path);
        let state = match store.load() {
            Some(snapshot) => {
                tracing::info!(
                    "restored position ({}, {}, {}) from snapshot",
                    snapshot.x,
                    snapshot.y,
                    snapshot.z
                );
                DeviceState {
                    x: snapshot.x,
                    y: snapshot.y,
                    z: snapshot.z,
                    lengths: snapshot.lengths,
                    moving: false,
                }
            }
            None => DeviceState {
                x: 0.0,
                y: 0.0,
                z: config.plotter.pen_up_z,
                lengths: kinematics.lengths(0.0, 0.0),
                moving: false,
            },
        };

        for (assembly, length) in axes.iter_mut().zip(state.lengths) {
            assembly.set_position_mm(length);
        }

        let interstep_delay = Duration::from_millis(config.plotter.interstep_delay_ms);
        Ok(Self {
            kinematics,
            axes,
            interpolator: Interpolator::new(interstep_delay),
            backlash: BacklashCompensator::new(config.plotter.backlash_steps, 2),
            state,
            store,
            travel,
            home_margin: config.plotter.home_margin_mm,
            interstep_delay,
        })
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn travel(&self) -> (f64, f64) {
        self.travel
    }

    /// Take the motion lock. Checked, never queued: a second caller gets
    /// `Busy` and must retry.
    pub(crate) fn begin_motion(&mut self) -> Result<(), MotionError> {
        if self.state.moving {
            return Err(MotionError::Busy);
        }
        self.state.moving = true;
        Ok(())
    }

    /// Release the motion lock and persist the snapshot. Runs exactly once
    /// per motion operation, on success and on failure alike, never inside
    /// the stepping loop.
    pub(crate) fn finish_motion(&mut self) {
        self.state.moving = false;
        let snapshot = PersistedSnapshot {
            x: self.state.x,
            y: self.state.y,
            z: self.state.z,
            lengths: self.state.lengths,
        };
        if let Err(e) = self.store.save(&snapshot) {
            tracing::error!("failed to persist position snapshot: {}", e);
        }
    }

    /// Move the implement to a Cartesian target.
    pub async fn move_xy(&mut self, x: f64, y: f64) -> Result<(), MotionError> {
        self.begin_motion()?;
        let result = self.move_xy_unlocked(x, y).await;
        self.finish_motion();
        result
    }

    pub(crate) async fn move_xy_unlocked(&mut self, x: f64, y: f64) -> Result<(), MotionError> {
        if !(0.0..=self.travel.0).contains(&x) || !(0.0..=self.travel.1).contains(&y) {
            return Err(MotionError::OutOfBounds {
                x,
                y,
                max_x: self.travel.0,
                max_y: self.travel.1,
            });
        }

        let target = self.kinematics.lengths(x, y);
        let steps = [
            self.axes[0].steps_for(target[0] - self.state.lengths[0]),
            self.axes[1].steps_for(target[1] - self.state.lengths[1]),
        ];

        if steps != [0, 0] {
            for assembly in self.axes.iter_mut() {
                assembly.set_enabled(true);
            }
            self.interpolator
                .run(&mut self.axes, &mut self.backlash, &steps)
                .await;
            for assembly in self.axes.iter_mut() {
                assembly.set_enabled(false);
            }
            for (i, assembly) in self.axes.iter().enumerate() {
                self.state.lengths[i] += steps[i] as f64 * assembly.mm_per_step();
            }
        }

        // Dead reckoning: the logical position is the requested target;
        // the lengths above advance only by whole steps.
        self.state.x = x;
        self.state.y = y;
        Ok(())
    }

    /// Record the pen lift state. No actuator is driven; `z >= 0` is
    /// lifted.
    pub async fn move_z(&mut self, z: f64) -> Result<(), MotionError> {
        self.begin_motion()?;
        self.move_z_unlocked(z);
        self.finish_motion();
        Ok(())
    }

    pub(crate) fn move_z_unlocked(&mut self, z: f64) {
        if (z >= 0.0) != (self.state.z >= 0.0) {
            tracing::debug!(lifted = z >= 0.0, "pen lift changed");
        }
        self.state.z = z;
    }

    /// Constant-rate raw stepping on one actuator, by name. A calibration
    /// aid: the Cartesian position is left untouched, only the actuator
    /// length bookkeeping follows.
    pub async fn jog(
        &mut self,
        actuator: &str,
        direction: Direction,
        steps: u32,
    ) -> Result<(), MotionError> {
        self.begin_motion()?;
        let result = self.jog_unlocked(actuator, direction, steps).await;
        self.finish_motion();
        result
    }

    pub(crate) async fn jog_unlocked(
        &mut self,
        actuator: &str,
        direction: Direction,
        steps: u32,
    ) -> Result<(), MotionError> {
        let index = self
            .axes
            .iter()
            .position(|a| a.name() == actuator)
            .ok_or_else(|| MotionError::UnknownActuator(actuator.to_string()))?;

        self.axes[index].set_enabled(true);
        let mut taken = 0i64;
        for _ in 0..steps {
            self.backlash.prepare(index, direction, &mut self.axes[index]);
            if self.axes[index].step(direction) {
                taken += 1;
            }
            tokio::time::sleep(self.interstep_delay).await;
        }
        self.axes[index].set_enabled(false);

        self.state.lengths[index] +=
            (taken * direction.sign()) as f64 * self.axes[index].mm_per_step();
        Ok(())
    }

    /// Move along a sequence of points under one lock acquisition.
    pub async fn trace(&mut self, points: &[(f64, f64)]) -> Result<(), MotionError> {
        self.begin_motion()?;
        let mut result = Ok(());
        for &(x, y) in points {
            result = self.move_xy_unlocked(x, y).await;
            if result.is_err() {
                break;
            }
        }
        self.finish_motion();
        result
    }

    /// Force the sled to the home position: pretend to be at the far
    /// corner, drive to (0, 0) letting the step guards and the physical
    /// stops absorb the difference, back off into the usable region, and
    /// re-zero.
    pub async fn home(&mut self) -> Result<(), MotionError> {
        self.begin_motion()?;
        tracing::info!("homing: driving into the stops");
        self.force_position(self.travel.0, self.travel.1);

        let mut result = self.move_xy_unlocked(0.0, 0.0).await;
        if result.is_ok() {
            result = self
                .move_xy_unlocked(self.home_margin, self.home_margin)
                .await;
        }

        self.force_position(0.0, 0.0);
        self.finish_motion();
        result
    }

    fn force_position(&mut self, x: f64, y: f64) {
        self.state.x = x;
        self.state.y = y;
        self.state.lengths = self.kinematics.lengths(x, y);
        for (assembly, length) in self.axes.iter_mut().zip(self.state.lengths) {
            assembly.set_position_mm(length);
        }
    }
}
