//! Kinematic contract shared by all robotic arms

extern crate nalgebra as na;

use std::fmt;
use std::str::FromStr;
use na::Isometry3;
use crate::arm_config::ArmConfig;
use crate::arm_error::ArmError;
use crate::constraints::JointLimits;
use crate::factory::ProtocolVersion;
use crate::joint_state::JointState;

/// Pose is used a pose of the robot tcp. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint positions in radians. The length must match the joint count of the robot.
pub type Joints = Vec<f64>;

/// Inverse kinematics may return zero, one or several solutions. The empty vector
/// means no solution was found; this is a normal outcome and not an error.
pub type Solutions = Vec<Joints>;

/// The two independent kinematics families every arm supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IkSolver {
    /// Closed-form solver, joints in kinematic (geometric) ordering. Multi-valued.
    Geometric,
    /// Numerical iterative solver, joints in the native driver ordering. At most one solution.
    Trac,
}

impl IkSolver {
    pub const ALL: [IkSolver; 2] = [IkSolver::Geometric, IkSolver::Trac];
}

impl fmt::Display for IkSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IkSolver::Geometric => write!(f, "ik_geo"),
            IkSolver::Trac => write!(f, "trac_ik"),
        }
    }
}

impl FromStr for IkSolver {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geo" | "ik_geo" | "geometric" => Ok(IkSolver::Geometric),
            "trac" | "trac_ik" => Ok(IkSolver::Trac),
            _ => Err(ArmError::ParseError(format!("Unknown IK solver: {}", s))),
        }
    }
}

/// Robotic arm that can be driven by the same calling code regardless of the
/// physical model behind it. Implementations are immutable after construction,
/// so concurrent read-only calls are safe.
pub trait RoboticArm: Send + Sync {
    /// Static description: names, home joint, frames and solver settings.
    fn config(&self) -> &ArmConfig;

    /// Joint limits in geometric (kinematic) ordering.
    fn limits(&self) -> &JointLimits;

    /// Protocol version this instance has been created for.
    fn protocol_version(&self) -> ProtocolVersion;

    /// Find the pose of the tool frame for the given joint positions. Out-of-range
    /// angles are accepted, only the length is checked.
    fn forward_kinematics(&self, joints: &[f64], solver: IkSolver) -> Result<Pose, ArmError>;

    /// Find joint positions reaching the given pose. The numerical family is seeded
    /// from the original home joint of the robot.
    fn inverse_kinematics(&self, pose: &Pose, solver: IkSolver) -> Solutions;

    /// Same as `inverse_kinematics` but continuing from the given previous joints:
    /// the numerical family uses them as seed, the geometric family sorts solutions by
    /// proximity to them and uses them to resolve the wrist singularity.
    fn inverse_continuing(&self, pose: &Pose, previous: &[f64], solver: IkSolver)
                          -> Result<Solutions, ArmError>;

    /// Reorder joints between the native (trac) and geometric conventions. Applies
    /// uniformly to position, velocity and torque. Self-inverse.
    fn reorder_joints(&self, state: &JointState) -> Result<JointState, ArmError>;

    fn name(&self) -> &str {
        &self.config().robot_name
    }

    fn joint_count(&self) -> usize {
        self.config().joint_names.len()
    }
}
