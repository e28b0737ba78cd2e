//! Rigid-body mass properties.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};

/// Mass, center of mass and inertia tensor of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Total mass.
    pub mass: f64,
    /// Center of mass in body coordinates.
    pub center_of_mass: Vector3<f64>,
    /// Inertia tensor.
    pub inertia: Matrix3<f64>,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::zero()
    }
}

impl MassProperties {
    /// Create mass properties with given values.
    #[must_use]
    pub const fn new(mass: f64, center_of_mass: Vector3<f64>, inertia: Matrix3<f64>) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// No mass at all.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            mass: 0.0,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::zeros(),
        }
    }

    /// A solid sphere of uniform density centered at the origin.
    ///
    /// Mass: `density * 4/3 * pi * r^3`. Inertia: `(2/5) * m * r^2`.
    #[must_use]
    pub fn sphere_with_density(density: f64, radius: f64) -> Self {
        let mass = density * (4.0 / 3.0) * PI * radius * radius * radius;
        let i = 0.4 * mass * radius * radius;
        Self {
            mass,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(i, i, i)),
        }
    }

    /// Rescale to a new total mass, keeping the distribution.
    ///
    /// A massless value has no distribution to scale and only takes the
    /// new total.
    pub fn adjust(&mut self, total: f64) {
        if self.mass != 0.0 {
            let scale = total / self.mass;
            self.inertia *= scale;
        }
        self.mass = total;
    }

    /// Accumulate another mass into this one.
    pub fn add(&mut self, other: &Self) {
        let total = self.mass + other.mass;
        if total != 0.0 {
            self.center_of_mass =
                (self.center_of_mass * self.mass + other.center_of_mass * other.mass) / total;
        }
        self.mass = total;
        self.inertia += other.inertia;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_mass() {
        let m = MassProperties::sphere_with_density(1.0, 1.0);
        assert_relative_eq!(m.mass, 4.0 / 3.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(m.inertia[(0, 0)], 0.4 * m.mass, epsilon = 1e-12);
        assert_relative_eq!(m.inertia[(0, 1)], 0.0);
    }

    #[test]
    fn test_adjust_scales_inertia() {
        let mut m = MassProperties::sphere_with_density(2.0, 10.0);
        let before = m;
        m.adjust(4.0);
        assert_relative_eq!(m.mass, 4.0);
        assert_relative_eq!(
            m.inertia[(1, 1)],
            before.inertia[(1, 1)] * 4.0 / before.mass,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_adjust_zero_mass() {
        let mut m = MassProperties::zero();
        m.adjust(3.0);
        assert_relative_eq!(m.mass, 3.0);
        assert_eq!(m.inertia, Matrix3::zeros());
    }

    #[test]
    fn test_add_weights_center() {
        let mut a = MassProperties::new(1.0, Vector3::new(0.0, 0.0, 0.0), Matrix3::identity());
        let b = MassProperties::new(3.0, Vector3::new(4.0, 0.0, 0.0), Matrix3::identity());
        a.add(&b);
        assert_relative_eq!(a.mass, 4.0);
        assert_relative_eq!(a.center_of_mass.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.inertia[(2, 2)], 2.0);
    }

    #[test]
    fn test_add_two_empty_masses() {
        let mut a = MassProperties::zero();
        a.add(&MassProperties::zero());
        assert_eq!(a, MassProperties::zero());
    }
}
