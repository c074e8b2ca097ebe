// src/motion/interpolator.rs - Synchronized multi-axis stepping
use std::time::Duration;

use crate::motion::actuator::{ActuatorAssembly, Direction};

/// Per-axis last-direction memory. On reversal, a fixed number of take-up
/// pulses are emitted through the assembly before real steps count. Purely
/// additive motion: the reported logical position does not change.
pub struct BacklashCompensator {
    take_up_steps: u32,
    last_direction: Vec<Option<Direction>>,
}

impl BacklashCompensator {
    pub fn new(take_up_steps: u32, axis_count: usize) -> Self {
        Self {
            take_up_steps,
            last_direction: vec![None; axis_count],
        }
    }

    /// Called before the first real step of `axis` in `direction`.
    pub fn prepare(
        &mut self,
        axis: usize,
        direction: Direction,
        assembly: &mut ActuatorAssembly,
    ) {
        let reversed = matches!(self.last_direction[axis], Some(last) if last != direction);
        if reversed && self.take_up_steps > 0 {
            tracing::debug!(
                actuator = assembly.name(),
                steps = self.take_up_steps,
                "taking up backlash"
            );
            for _ in 0..self.take_up_steps {
                assembly.take_up(direction);
            }
        }
        self.last_direction[axis] = Some(direction);
    }
}

/// Emits a time-ordered sequence of single-actuator step events such that
/// motion is linear in actuator space: no actuator's fractional progress
/// diverges from the others' by more than one step.
pub struct Interpolator {
    interstep_delay: Duration,
}

impl Interpolator {
    pub fn new(interstep_delay: Duration) -> Self {
        Self { interstep_delay }
    }

    /// Step every axis by its signed step count, synchronized. Blocks (as a
    /// cooperative await) until each axis has emitted exactly its count.
    ///
    /// Each axis advances `n_i / n_max` per tick; a pulse fires whenever the
    /// accumulator crosses an integer boundary. The accumulator is kept in
    /// integer form (`tick * n_i`, compared against multiples of `n_max`) so
    /// the final counts are exact.
    pub async fn run(
        &self,
        axes: &mut [ActuatorAssembly],
        backlash: &mut BacklashCompensator,
        steps: &[i64],
    ) {
        debug_assert_eq!(axes.len(), steps.len());

        let counts: Vec<i64> = steps.iter().map(|s| s.abs()).collect();
        let n_max = counts.iter().copied().max().unwrap_or(0);
        if n_max == 0 {
            // Sub-step move: nothing to do.
            return;
        }

        let mut emitted = vec![0i64; axes.len()];
        for tick in 1..=n_max {
            for (i, assembly) in axes.iter_mut().enumerate() {
                if counts[i] == 0 {
                    continue;
                }
                let due = tick * counts[i] / n_max;
                if emitted[i] < due {
                    let direction = Direction::from_delta(steps[i]);
                    backlash.prepare(i, direction, assembly);
                    assembly.step(direction);
                    emitted[i] += 1;
                }
            }
            tokio::time::sleep(self.interstep_delay).await;
        }
    }
}
