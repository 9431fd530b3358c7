//! Closed-form kinematics of arms with three parallel and two intersecting axes (Universal Robots)

use std::f64::consts::PI;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3, Quaternion};
use tracing::{debug, warn};
use crate::kinematic_traits::{Pose, Solutions};
use crate::parameters::ur_kinematics::Parameters;
use crate::utils::normalize_angle;
use crate::math_tools::{are_pos_equivalent, are_quat_equivalent, TOLERANCE};

/// |sin(θ5)| below this value is the wrist singularity, θ6 is then not defined.
const WRIST_SINGULARITY: f64 = 1e-6;

/// Argument of acos/asin exceeding 1 by less than this is rounding noise and is clamped.
const UNIT_SLACK: f64 = 1e-9;

/// Two candidates closer than this (radians, any joint) are the same solution.
const DUPLICATE: f64 = 1e-9;

/// Rotation of the numerical solver's tip frame relative to the DH flange frame.
pub fn tool_offset() -> UnitQuaternion<f64> {
    UnitQuaternion::from_quaternion(Quaternion::new(0.5, 0.5, 0.5, 0.5))
}

#[derive(Debug, Clone)]
pub struct GeometricSolver {
    parameters: Parameters,
    links: [Isometry3<f64>; 6],
    tool: Isometry3<f64>,
}

impl GeometricSolver {
    pub fn new(parameters: Parameters) -> Self {
        GeometricSolver {
            parameters,
            links: std::array::from_fn(|i| parameters.link(i)),
            tool: Isometry3::from_parts(Translation3::identity(), tool_offset()),
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// DH transform of the joint `i` rotated to `theta`.
    fn joint(&self, i: usize, theta: f64) -> Isometry3<f64> {
        Isometry3::rotation(Vector3::z() * theta) * self.links[i]
    }

    /// Pose of the DH flange frame (no tool offset).
    pub fn flange(&self, joints: &[f64]) -> Pose {
        joints.iter().take(6).enumerate()
            .fold(Isometry3::identity(), |pose, (i, &theta)| pose * self.joint(i, theta))
    }

    /// Forward kinematics, the returned pose is in the frame convention of the numerical solver.
    pub fn forward(&self, joints: &[f64]) -> Pose {
        self.flange(joints) * self.tool
    }

    /// All joint configurations reaching the pose, angles normalized to (-π, π]. Each returned
    /// solution is verified with forward kinematics. If `previous` is given, it is used to pick θ6
    /// in the wrist singularity and the solutions are sorted by proximity to it (closest first).
    pub fn inverse(&self, pose: &Pose, previous: Option<&[f64]>) -> Solutions {
        let flange = pose * self.tool.inverse();
        let candidates = self.candidates(&flange, previous);
        let total = candidates.len();

        let mut solutions: Solutions = Vec::with_capacity(total);
        for candidate in candidates {
            if !candidate.iter().all(|q| q.is_finite()) {
                continue;
            }
            let check = self.flange(&candidate);
            if !are_pos_equivalent(&check.translation.vector, &flange.translation.vector, TOLERANCE)
                || !are_quat_equivalent(&check.rotation, &flange.rotation, TOLERANCE) {
                continue;
            }
            let duplicate = solutions.iter().any(|s: &Vec<f64>| {
                s.iter().zip(&candidate).all(|(a, b)| normalize_angle(a - b).abs() < DUPLICATE)
            });
            if !duplicate {
                solutions.push(candidate.to_vec());
            }
        }

        if total > 0 && solutions.is_empty() {
            warn!("All {} closed-form candidates were rejected by the forward check", total);
        } else {
            debug!("{} of {} closed-form candidates accepted", solutions.len(), total);
        }

        if let Some(previous) = previous {
            solutions.sort_by(|a, b| {
                angular_distance(a, previous).total_cmp(&angular_distance(b, previous))
            });
        }
        solutions
    }

    /// Up to 8 raw candidates: two shoulder, two wrist and two elbow configurations.
    fn candidates(&self, flange: &Pose, previous: Option<&[f64]>) -> Vec<[f64; 6]> {
        let Parameters { a2, a3, d4, d6, .. } = self.parameters;
        let m = *flange.rotation.to_rotation_matrix().matrix();
        let p = flange.translation.vector;
        let z6 = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);

        let mut candidates = Vec::with_capacity(8);

        // The wrist center must stay d4 away from the plane of the parallel axes.
        let p05 = p - d6 * z6;
        let radius = p05.x.hypot(p05.y);
        if radius < d4.abs() || radius == 0.0 {
            return candidates;
        }
        let psi = p05.y.atan2(p05.x);
        let phi = (d4 / radius).asin();

        for theta1 in [psi + phi, psi + PI - phi] {
            let (s1, c1) = theta1.sin_cos();
            let Some(cos5) = clamp_unit((p.x * s1 - p.y * c1 - d4) / d6) else {
                continue;
            };
            let acos5 = cos5.acos();
            for theta5 in [acos5, -acos5] {
                let s5 = theta5.sin();
                let theta6 = if s5.abs() < WRIST_SINGULARITY {
                    previous.map_or(0.0, |q| q[5])
                } else {
                    let y = -(m[(0, 1)] * s1 - m[(1, 1)] * c1) / s5;
                    let x = (m[(0, 0)] * s1 - m[(1, 0)] * c1) / s5;
                    y.atan2(x)
                };

                let t14 = self.joint(0, theta1).inverse() * flange
                    * self.joint(5, theta6).inverse() * self.joint(4, theta5).inverse();
                let (px, py) = (t14.translation.x, t14.translation.y);
                let Some(cos3) = clamp_unit((px * px + py * py - a2 * a2 - a3 * a3) / (2.0 * a2 * a3)) else {
                    continue;
                };
                let r14 = *t14.rotation.to_rotation_matrix().matrix();
                let theta234 = r14[(1, 0)].atan2(r14[(0, 0)]);

                let acos3 = cos3.acos();
                for theta3 in [acos3, -acos3] {
                    let (s3, c3) = theta3.sin_cos();
                    let theta2 = py.atan2(px) - (a3 * s3).atan2(a2 + a3 * c3);
                    let theta4 = theta234 - theta2 - theta3;
                    candidates.push([theta1, theta2, theta3, theta4, theta5, theta6].map(normalize_angle));
                }
            }
        }
        candidates
    }
}

fn clamp_unit(value: f64) -> Option<f64> {
    if value.abs() <= 1.0 {
        Some(value)
    } else if value.abs() <= 1.0 + UNIT_SLACK {
        Some(value.signum())
    } else {
        None
    }
}

/// Joint space distance where every joint difference is taken the short way around.
pub fn angular_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b)
        .map(|(x, y)| normalize_angle(x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
