// src/motion/kinematics.rs
use crate::config::{Config, TrapezoidConfig};

/// Forward kinematics: Cartesian target to per-actuator lengths. Only the
/// forward direction drives stepping; the Cartesian position is tracked
/// separately and never recovered by inverting the geometry.
pub trait Kinematics {
    fn lengths(&self, x: f64, y: f64) -> [f64; 2];
}

/// Identity transform for the XY gantry variant: each actuator directly
/// owns one Cartesian axis, capped to its travel.
pub struct Orthogonal {
    axis_max: [f64; 2],
}

impl Orthogonal {
    pub fn new(axis_max: [f64; 2]) -> Self {
        Self { axis_max }
    }
}

impl Kinematics for Orthogonal {
    fn lengths(&self, x: f64, y: f64) -> [f64; 2] {
        [x.clamp(0.0, self.axis_max[0]), y.clamp(0.0, self.axis_max[1])]
    }
}

/// Two belts suspending a sled between fixed anchor points. The belts and
/// the line between the anchors form an acute trapezoid; dropping verticals
/// from the sled's belt catch gives two right triangles, solved with
/// Pythagoras:
///
/// ```text
///        b ||      || b
///         _\/______\/_
///         \   |  |   /
///     c -> \  |  |  / <- c
///      a ---->|  |<---- a
///            \|__|/
/// ```
pub struct Trapezoid {
    upper_base: f64,
    implement_offset_x: f64,
    implement_offset_y: f64,
    keepout_x: f64,
    keepout_y: f64,
}

impl Trapezoid {
    pub fn new(config: &TrapezoidConfig) -> Self {
        Self {
            upper_base: config.upper_base,
            implement_offset_x: config.implement_offset_x,
            implement_offset_y: config.implement_offset_y,
            keepout_x: config.keepout_x,
            keepout_y: config.keepout_y,
        }
    }
}

impl Kinematics for Trapezoid {
    fn lengths(&self, x: f64, y: f64) -> [f64; 2] {
        // The "a" right-triangle leg is the same for both sides.
        let a2 = (self.keepout_y + y - self.implement_offset_y).powi(2);

        let left_b = self.keepout_x + x - self.implement_offset_x;
        let left = (a2 + left_b.powi(2)).sqrt();

        let right_b = self.upper_base - left_b - 2.0 * self.implement_offset_x;
        let right = (a2 + right_b.powi(2)).sqrt();

        [left, right]
    }
}

/// Factory keyed by the configured geometry. Validation has already
/// required the [trapezoid] section when geometry is trapezoidal.
pub fn create_kinematics(config: &Config) -> Box<dyn Kinematics> {
    let axis_max = [config.plotter.travel_x, config.plotter.travel_y];
    match config.plotter.geometry.as_str() {
        "trapezoidal" => match &config.trapezoid {
            Some(trapezoid) => Box::new(Trapezoid::new(trapezoid)),
            None => Box::new(Orthogonal::new(axis_max)),
        },
        _ => Box::new(Orthogonal::new(axis_max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trapezoid() -> Trapezoid {
        Trapezoid::new(&TrapezoidConfig {
            upper_base: 649.0,
            implement_offset_x: 11.5,
            implement_offset_y: 20.0,
            keepout_x: 40.0,
            keepout_y: 40.0,
        })
    }

    #[test]
    fn test_orthogonal_is_identity_within_travel() {
        let kinematics = Orthogonal::new([438.0, 485.0]);
        assert_eq!(kinematics.lengths(100.0, 200.0), [100.0, 200.0]);
        // Out-of-range inputs are capped to the axis travel.
        assert_eq!(kinematics.lengths(-5.0, 500.0), [0.0, 485.0]);
    }

    #[test]
    fn test_trapezoid_lengths_are_positive() {
        let kinematics = trapezoid();
        let [left, right] = kinematics.lengths(0.0, 0.0);
        assert!(left > 0.0);
        assert!(right > 0.0);
    }

    #[test]
    fn test_trapezoid_symmetric_at_center() {
        let kinematics = trapezoid();
        // With left_b == right_b the two legs are equal. That happens at
        // left_b = (U - 2*ox) / 2.
        let x = (649.0 - 2.0 * 11.5) / 2.0 - 40.0 + 11.5;
        let [left, right] = kinematics.lengths(x, 100.0);
        assert!((left - right).abs() < 1e-9);
    }

    #[test]
    fn test_trapezoid_monotonic_over_travel_grid() {
        let kinematics = trapezoid();
        let (travel_x, travel_y) = (438.0, 485.0);
        let step = 20.0;

        let mut y = 0.0;
        while y <= travel_y {
            let mut x = 0.0;
            while x + step <= travel_x {
                let [left_a, right_a] = kinematics.lengths(x, y);
                let [left_b, right_b] = kinematics.lengths(x + step, y);
                // Increasing x lengthens the left belt and shortens the right.
                assert!(left_b >= left_a, "left not monotonic at ({}, {})", x, y);
                assert!(right_b <= right_a, "right not monotonic at ({}, {})", x, y);
                x += step;
            }
            y += step;
        }

        let mut x = 0.0;
        while x <= travel_x {
            let mut y = 0.0;
            while y + step <= travel_y {
                let [left_a, right_a] = kinematics.lengths(x, y);
                let [left_b, right_b] = kinematics.lengths(x, y + step);
                // Increasing y lengthens both belts.
                assert!(left_b >= left_a, "left not monotonic at ({}, {})", x, y);
                assert!(right_b >= right_a, "right not monotonic at ({}, {})", x, y);
                y += step;
            }
            x += step;
        }
    }
}
