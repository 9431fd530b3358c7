//! Helper functions

use std::f64::consts::PI;
use nalgebra::Isometry3;

/// Normalize the angle into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Euclidean distance in joint space between two joint vectors of the same length.
pub fn joint_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Joint values as degrees, for logging.
pub fn format_joints(joints: &[f64]) -> String {
    let row: Vec<String> = joints.iter().map(|j| format!("{:5.2}", j.to_degrees())).collect();
    format!("[{}]", row.join(" "))
}

pub fn format_pose(isometry: &Isometry3<f64>) -> String {
    let translation = isometry.translation.vector;
    let rotation = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}
