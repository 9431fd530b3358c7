//! Numerical inverse kinematics in the manner of TRAC-IK: damped least squares descent on the
//! numerical Jacobian, restarted from random configurations until a solution is found or the
//! time budget runs out.

use std::time::Instant;
use nalgebra::Vector6;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};
use crate::arm_config::{IkConfig, SolveType};
use crate::arm_error::{check_length, ArmError};
use crate::chain::SerialChain;
use crate::jacobian::Jacobian;
use crate::joint_state::JointPermutation;
use crate::kinematic_traits::{Joints, Pose};
use crate::utils::joint_distance;

/// Finite difference step of the Jacobian.
const JACOBIAN_EPSILON: f64 = 1e-7;

const LAMBDA_INITIAL: f64 = 1e-2;
const LAMBDA_MIN: f64 = 1e-9;
const LAMBDA_MAX: f64 = 1e3;

/// Solver working on a serial chain. Joints at the public interface are in the native ordering,
/// given by the joint names the solver is constructed with.
#[derive(Debug, Clone)]
pub struct TracSolver {
    chain: SerialChain,
    to_chain: JointPermutation,
    to_native: JointPermutation,
    config: IkConfig,
}

/// Translational and rotational error between poses as a single 6D vector.
pub fn pose_error(target: &Pose, current: &Pose) -> Vector6<f64> {
    let position = target.translation.vector - current.translation.vector;
    let rotation = (target.rotation * current.rotation.inverse()).scaled_axis();
    Vector6::new(position.x, position.y, position.z, rotation.x, rotation.y, rotation.z)
}

impl TracSolver {
    pub fn new(chain: SerialChain, native_names: &[String], config: IkConfig) -> Result<Self, ArmError> {
        let to_chain = JointPermutation::between(native_names, &chain.joint_names())?;
        let to_native = to_chain.inverse();
        Ok(TracSolver { chain, to_chain, to_native, config })
    }

    pub fn chain(&self) -> &SerialChain {
        &self.chain
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    /// Forward kinematics for joints in native ordering.
    pub fn forward(&self, native: &[f64]) -> Result<Pose, ArmError> {
        let angles = self.to_chain.apply(native)?;
        Ok(self.chain.forward(&angles))
    }

    /// Find joints (native ordering) reaching the pose, starting from the seed (native ordering).
    /// Returns None if nothing converged within the time budget.
    pub fn inverse(&self, pose: &Pose, seed: &[f64]) -> Result<Option<Joints>, ArmError> {
        check_length(seed.len(), self.chain.len())?;
        let seed = self.to_chain.apply(seed)?;
        let limits = self.chain.limits();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let started = Instant::now();

        let mut best: Option<(f64, Joints)> = None;
        let mut start = seed.clone();
        let mut attempts = 0;
        loop {
            attempts += 1;
            if let Some(found) = self.descend(pose, start).and_then(|q| limits.wrap(&q)) {
                let distance = joint_distance(&found, &seed);
                trace!("Attempt {} converged, distance to seed {:.5}", attempts, distance);
                if self.config.solve_type == SolveType::Speed {
                    best = Some((distance, found));
                    break;
                }
                if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                    best = Some((distance, found));
                }
            }
            if started.elapsed() >= self.config.timeout {
                break;
            }
            start = limits.sample(&mut rng);
        }

        debug!("Numerical IK: {} attempt(s), {}", attempts,
               if best.is_some() { "converged" } else { "no solution" });
        best.map(|(_, angles)| self.to_native.apply(&angles)).transpose()
    }

    /// Damped least squares with adaptive damping. Joint positions are in chain ordering.
    fn descend(&self, target: &Pose, mut angles: Joints) -> Option<Joints> {
        let forward = |q: &[f64]| self.chain.forward(q);
        let mut error = pose_error(target, &forward(&angles));
        let mut lambda = LAMBDA_INITIAL;
        let mut jacobian = Jacobian::new(&forward, &angles, JACOBIAN_EPSILON);

        for _ in 0..self.config.max_iterations {
            if error.norm() < self.config.error {
                return Some(angles);
            }
            let step = jacobian.damped_step(&error, lambda)?;
            let candidate: Joints = angles.iter().zip(step.iter()).map(|(q, dq)| q + dq).collect();
            let candidate_error = pose_error(target, &forward(&candidate));
            if candidate_error.norm() < error.norm() {
                angles = candidate;
                error = candidate_error;
                lambda = (lambda * 0.5).max(LAMBDA_MIN);
                jacobian = Jacobian::new(&forward, &angles, JACOBIAN_EPSILON);
            } else {
                lambda *= 4.0;
                if lambda > LAMBDA_MAX {
                    return None;
                }
            }
        }
        if error.norm() < self.config.error { Some(angles) } else { None }
    }

}
