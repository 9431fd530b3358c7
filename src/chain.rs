//! Serial chain of revolute joints, in the form used by URDF: every joint is a fixed origin
//! transform followed by a rotation about the joint axis.

use std::f64::consts::PI;
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use crate::arm_error::{check_length, ArmError};
use crate::constraints::JointLimits;
use crate::kinematic_traits::Pose;
use crate::parameters::ur_kinematics::Parameters;

/// Kinematic (base to tip) joint ordering of Universal Robots arms.
pub const UR_KINEMATIC_JOINT_NAMES: [&str; 6] = [
    "shoulder_pan_joint",
    "shoulder_lift_joint",
    "elbow_joint",
    "wrist_1_joint",
    "wrist_2_joint",
    "wrist_3_joint",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ChainJoint {
    pub name: String,
    /// Transform from the parent link to the joint frame, at zero joint position.
    pub origin: Isometry3<f64>,
    pub axis: Unit<Vector3<f64>>,
}

impl ChainJoint {
    pub fn transform(&self, angle: f64) -> Isometry3<f64> {
        self.origin * Isometry3::from_parts(Translation3::identity(),
                                            UnitQuaternion::from_axis_angle(&self.axis, angle))
    }
}

#[derive(Debug, Clone)]
pub struct SerialChain {
    joints: Vec<ChainJoint>,
    /// Fixed transform from the last joint to the tip link.
    tip: Isometry3<f64>,
    limits: JointLimits,
}

impl SerialChain {
    pub fn new(joints: Vec<ChainJoint>, tip: Isometry3<f64>, limits: JointLimits) -> Result<Self, ArmError> {
        if joints.is_empty() {
            return Err(ArmError::KinematicsConfigurationError("Chain has no movable joints".into()));
        }
        check_length(limits.len(), joints.len())?;
        Ok(SerialChain { joints, tip, limits })
    }

    /// Chain equivalent to the DH description of the arm with the given tool rotation at the tip.
    /// Joint limits are a full turn in both directions.
    pub fn from_dh(parameters: &Parameters, tool: UnitQuaternion<f64>) -> Self {
        let joints = UR_KINEMATIC_JOINT_NAMES.iter().enumerate()
            .map(|(i, name)| ChainJoint {
                name: name.to_string(),
                origin: if i == 0 { Isometry3::identity() } else { parameters.link(i - 1) },
                axis: Vector3::z_axis(),
            })
            .collect();
        SerialChain {
            joints,
            tip: parameters.link(5) * Isometry3::from_parts(Translation3::identity(), tool),
            limits: JointLimits::symmetric(6, 2.0 * PI),
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    pub fn joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    /// Limits in chain order.
    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    pub fn tip(&self) -> &Isometry3<f64> {
        &self.tip
    }

    /// Pose of the tip link for joint positions in chain order. The caller checks the length.
    pub fn forward(&self, angles: &[f64]) -> Pose {
        self.joints.iter().zip(angles)
            .fold(Isometry3::identity(), |pose, (joint, &angle)| pose * joint.transform(angle))
            * self.tip
    }
}
