//! Universal Robots arm driven through both kinematics families

use std::fmt;
use tracing::{info, warn};
use crate::arm_config::ArmConfig;
use crate::arm_error::{check_length, ArmError};
use crate::chain::SerialChain;
use crate::constraints::JointLimits;
use crate::factory::ProtocolVersion;
use crate::geometric::{tool_offset, GeometricSolver};
use crate::joint_state::{JointPermutation, JointState};
use crate::kinematic_traits::{IkSolver, Pose, RoboticArm, Solutions};
use crate::parameters::ur_kinematics::Parameters;
use crate::trac::TracSolver;

/// Arm with three parallel and two intersecting axes. The closed-form family works in the
/// kinematic joint ordering; the numerical family works in the native ordering of the
/// configured joint names.
#[derive(Debug)]
pub struct RoboticArmUr {
    config: ArmConfig,
    protocol: ProtocolVersion,
    geometric: GeometricSolver,
    trac: TracSolver,
    limits: JointLimits,
    reorder: JointPermutation,
}

impl RoboticArmUr {
    /// Build the arm with the numerical chain derived from the DH parameters.
    pub fn new(config: ArmConfig, parameters: Parameters, protocol: ProtocolVersion) -> Result<Self, ArmError> {
        let chain = SerialChain::from_dh(&parameters, tool_offset());
        Self::with_chain(config, parameters, chain, protocol)
    }

    /// Build the arm with an explicitly given chain for the numerical family (usually read from URDF).
    /// The chain must list the same joints as the configuration, in kinematic order.
    pub fn with_chain(config: ArmConfig, parameters: Parameters, chain: SerialChain,
                      protocol: ProtocolVersion) -> Result<Self, ArmError> {
        config.validate()?;
        if !parameters.is_valid() {
            return Err(ArmError::KinematicsConfigurationError(
                format!("Invalid DH parameters for {}", config.robot_name)));
        }
        check_length(chain.len(), 6)?;
        check_length(config.joint_count(), 6)?;

        let reorder = JointPermutation::between(&config.joint_names, &chain.joint_names())?;
        if !reorder.is_involution() {
            return Err(ArmError::KinematicsConfigurationError(format!(
                "Joint reordering of {} must be self-inverse", config.robot_name)));
        }
        let limits = chain.limits().clone();
        let trac = TracSolver::new(chain, &config.joint_names, config.ik.clone())?;

        Ok(RoboticArmUr {
            geometric: GeometricSolver::new(parameters),
            trac,
            limits,
            reorder,
            config,
            protocol,
        })
    }

    pub fn geometric(&self) -> &GeometricSolver {
        &self.geometric
    }

    pub fn trac(&self) -> &TracSolver {
        &self.trac
    }

    /// Log the description of the robot.
    pub fn print_info(&self) {
        for line in self.config.to_string().lines() {
            info!("{}", line);
        }
        info!("Protocol: {}", self.protocol);
    }

    fn geometric_solutions(&self, pose: &Pose, previous: Option<&[f64]>) -> Solutions {
        self.geometric.inverse(pose, previous).iter()
            .filter_map(|solution| self.limits.wrap(solution))
            .collect()
    }

    fn trac_solutions(&self, pose: &Pose, seed: &[f64]) -> Result<Solutions, ArmError> {
        Ok(self.trac.inverse(pose, seed)?.into_iter().collect())
    }
}

impl RoboticArm for RoboticArmUr {
    fn config(&self) -> &ArmConfig {
        &self.config
    }

    fn limits(&self) -> &JointLimits {
        &self.limits
    }

    fn protocol_version(&self) -> ProtocolVersion {
        self.protocol
    }

    fn forward_kinematics(&self, joints: &[f64], solver: IkSolver) -> Result<Pose, ArmError> {
        check_length(joints.len(), self.joint_count())?;
        match solver {
            IkSolver::Geometric => Ok(self.geometric.forward(joints)),
            IkSolver::Trac => self.trac.forward(joints),
        }
    }

    fn inverse_kinematics(&self, pose: &Pose, solver: IkSolver) -> Solutions {
        match solver {
            IkSolver::Geometric => self.geometric_solutions(pose, None),
            IkSolver::Trac => self.trac_solutions(pose, &self.config.original_home_joint)
                .unwrap_or_else(|e| {
                    warn!("Numerical IK failed for {}: {}", self.config.robot_name, e);
                    Vec::new()
                }),
        }
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &[f64], solver: IkSolver) -> Result<Solutions, ArmError> {
        check_length(previous.len(), self.joint_count())?;
        match solver {
            IkSolver::Geometric => Ok(self.geometric_solutions(pose, Some(previous))),
            IkSolver::Trac => self.trac_solutions(pose, previous),
        }
    }

    fn reorder_joints(&self, state: &JointState) -> Result<JointState, ArmError> {
        state.check_length(self.joint_count())?;
        self.reorder.apply_state(state)
    }
}

impl fmt::Display for RoboticArmUr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.config)?;
        write!(f, "Protocol: {}", self.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ur5() -> RoboticArmUr {
        RoboticArmUr::new(ArmConfig::universal_robot("ur5_robot"), Parameters::ur5(),
                          ProtocolVersion::Ros1Noetic).unwrap()
    }

    #[test]
    fn test_wrong_length_rejected() {
        let arm = ur5();
        assert!(matches!(arm.forward_kinematics(&[0.0; 5], IkSolver::Geometric),
                         Err(ArmError::InvalidLength { expected: 6, found: 5 })));
        assert!(arm.forward_kinematics(&[0.0; 7], IkSolver::Trac).is_err());
        assert!(arm.inverse_continuing(&Pose::identity(), &[0.0; 3], IkSolver::Geometric).is_err());
        assert!(arm.reorder_joints(&JointState::at_rest(vec![0.0; 4])).is_err());
    }

    #[test]
    fn test_reorder_swaps_first_and_third() {
        let arm = ur5();
        let state = JointState::at_rest(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let reordered = arm.reorder_joints(&state).unwrap();
        assert_eq!(reordered.position, vec![3.0, 2.0, 1.0, 4.0, 5.0, 6.0]);
        assert_eq!(arm.reorder_joints(&reordered).unwrap(), state);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let result = RoboticArmUr::new(ArmConfig::universal_robot("broken"), Parameters::new(),
                                       ProtocolVersion::Ros2Humble);
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let text = ur5().to_string();
        assert!(text.contains("Number of joints: 6"));
        assert!(text.contains("Protocol: noetic"));
    }
}
