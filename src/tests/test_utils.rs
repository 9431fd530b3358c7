use std::fs::read_to_string;
use anyhow::{Context, Result};
use nalgebra::Isometry3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::math_tools::{are_pos_equivalent, are_quat_equivalent};
use crate::utils::normalize_angle;

/// Tolerance of pose and joint comparisons between solver families.
pub(crate) const TOLERANCE: f64 = 2e-4;

pub(crate) const CONFIG: &str = "src/tests/data/arm_robot_config.yaml";
pub(crate) const UR5_URDF: &str = "src/tests/data/ur5.urdf";

pub(crate) fn read_fixture(path: &str) -> Result<String> {
    read_to_string(path).with_context(|| format!("Failed to read test data file {}", path))
}

pub(crate) fn are_isometries_close(a: &Isometry3<f64>, b: &Isometry3<f64>) -> bool {
    are_pos_equivalent(&a.translation.vector, &b.translation.vector, TOLERANCE)
        && are_quat_equivalent(&a.rotation, &b.rotation, TOLERANCE)
}

/// True if some solution matches the expected joints, every angle taken modulo a full turn.
pub(crate) fn found_joints_approx_equal(solutions: &[Vec<f64>], expected: &[f64]) -> bool {
    solutions.iter().any(|solution| {
        solution.len() == expected.len()
            && solution.iter().zip(expected).all(|(a, b)| normalize_angle(a - b).abs() < TOLERANCE)
    })
}

/// Reproducible random joint vectors inside (-range, range).
pub(crate) fn random_joints(seed: u64, count: usize, range: f64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..6).map(|_| rng.gen_range(-range..range)).collect())
        .collect()
}
