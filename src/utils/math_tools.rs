//! Numeric predicates shared by the kinematics and the waypoint orientation code

use nalgebra::{UnitQuaternion, Vector3};

/// Default tolerance of the equivalence predicates.
pub const TOLERANCE: f64 = 1e-5;

/// Angle of the rotation taking `a` into `b`, in [0, π]. Taken from the relative quaternion
/// with atan2, which stays accurate near the identity; `q` and `-q` are at zero distance.
pub fn rotation_difference(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> f64 {
    let relative = a.inverse() * b;
    2.0 * relative.imag().norm().atan2(relative.w.abs())
}

/// True if both quaternions represent the same rotation within the tolerance (radians).
pub fn are_quat_equivalent(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, tolerance: f64) -> bool {
    rotation_difference(a, b) < tolerance
}

/// True if the Euclidean distance between positions is below the tolerance.
pub fn are_pos_equivalent(a: &Vector3<f64>, b: &Vector3<f64>, tolerance: f64) -> bool {
    (a - b).norm() < tolerance
}

/// True if the text parses as a finite or infinite floating point number.
pub fn is_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_antipodal_quaternions_equivalent() {
        let q = UnitQuaternion::from_euler_angles(0.3, -1.2, 2.0);
        let minus_q = UnitQuaternion::new_unchecked(-q.into_inner());
        assert!(are_quat_equivalent(&q, &q, TOLERANCE));
        assert!(are_quat_equivalent(&q, &minus_q, TOLERANCE));
        assert!(rotation_difference(&q, &minus_q) < 1e-7);
    }

    #[test]
    fn test_rotation_difference() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.1);
        let b = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.4);
        assert!((rotation_difference(&a, &b) - 0.3).abs() < 1e-12);
        assert!(!are_quat_equivalent(&a, &b, 0.2));
    }

    #[test]
    fn test_position_equivalence() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        assert!(are_pos_equivalent(&a, &Vector3::new(1.0, 2.0, 3.0 + 1e-6), TOLERANCE));
        assert!(!are_pos_equivalent(&a, &Vector3::new(1.0, 2.0, 3.1), TOLERANCE));
    }

    #[test]
    fn test_small_rotations_resolved() {
        let a = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.2);
        let b = a * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1e-10);
        let difference = rotation_difference(&a, &b);
        assert!((difference - 1e-10).abs() < 1e-14, "{}", difference);
        assert!(!are_quat_equivalent(&a, &b, 1e-11));
        assert!(are_quat_equivalent(&a, &b, 1e-9));
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("1.5"));
        assert!(is_number(" -3e2 "));
        assert!(!is_number("wpA"));
        assert!(!is_number(""));
    }
}
