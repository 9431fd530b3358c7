//! Defines the DH parameter data structure of the supported arms

pub mod ur_kinematics {
    use std::f64::consts::FRAC_PI_2;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

    /// Parameters for the robot. See [parameters_robots.rs](parameters_robots.rs) for examples of concrete robot models.
    /// The arm has three parallel axes (joints 2, 3, 4) and two intersecting ones
    /// (joints 5 and 6 are offset but not skewed), as Universal Robots arms.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Parameters {
        /// Height of the shoulder above the base (joint 1 to joint 2).
        pub d1: f64,

        /// Length of the upper arm (joint 2 to joint 3). Negative in the UR convention.
        pub a2: f64,

        /// Length of the forearm (joint 3 to joint 4). Negative in the UR convention.
        pub a3: f64,

        /// Lateral offset of the wrist (joint 4).
        pub d4: f64,

        /// Offset between wrist 1 and wrist 2.
        pub d5: f64,

        /// Offset between wrist 2 and the tool flange.
        pub d6: f64,
    }

    impl Parameters {
        /// Link twists of the standard DH convention for this geometry.
        pub const ALPHA: [f64; 6] = [FRAC_PI_2, 0.0, 0.0, FRAC_PI_2, -FRAC_PI_2, 0.0];

        /// Link lengths (a) in the DH table order.
        pub fn a(&self) -> [f64; 6] {
            [0.0, self.a2, self.a3, 0.0, 0.0, 0.0]
        }

        /// Link offsets (d) in the DH table order.
        pub fn d(&self) -> [f64; 6] {
            [self.d1, 0.0, 0.0, self.d4, self.d5, self.d6]
        }

        /// Fixed part of the DH transform of the joint `i`: `Tz(d) * Tx(a) * Rx(alpha)`.
        /// The complete joint transform is `Rz(theta)` followed by this.
        pub fn link(&self, i: usize) -> Isometry3<f64> {
            Isometry3::from_parts(
                Translation3::new(self.a()[i], 0.0, self.d()[i]),
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), Self::ALPHA[i]),
            )
        }

        /// All parameters must be finite, and the arm must have non-zero upper arm and forearm.
        pub fn is_valid(&self) -> bool {
            [self.d1, self.a2, self.a3, self.d4, self.d5, self.d6].iter().all(|v| v.is_finite())
                && self.a2 != 0.0 && self.a3 != 0.0 && self.d6 != 0.0
        }
    }
}
