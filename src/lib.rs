//! Interchangeable robotic arm kinematics and plane constrained waypoint orientation
//!
//! Every arm is driven through the [`kinematic_traits::RoboticArm`] trait and offers two
//! independent kinematics families:
//!
//! - **Geometric** (`ik_geo`): closed-form inverse kinematics for arms with three parallel
//!   axes and an offset wrist, as Universal Robots arms. Returns all (up to 8) solutions,
//!   normalized and cross-checked with forward kinematics. Joints are in the kinematic
//!   (base to tip) ordering.
//! - **Trac** (`trac_ik`): numerical damped least squares on a serial chain, either derived
//!   from the DH parameters or read from URDF, restarted from random configurations within
//!   the time budget. Returns at most one solution. Joints are in the native driver ordering.
//!
//! The two orderings of the Universal Robots arms differ by swapping the first and the third
//! joint; `reorder_joints` converts between them.
//!
//! Arms are created by name and protocol version through [`factory::RoboticArmFactory`].
//!
//! # Waypoints
//!
//! [`subtask::Subtask`] receives text records `<id>,x1,y1,z1,x2,y2,z2,r`, rejects malformed
//! ones, ignores identifiers received before and keeps the resulting regions of interest
//! ([`roi::Roi`]) in arrival order. The orientation of each region rotates a configured
//! reference vector onto the waypoint direction, within the plane spanned by the waypoint
//! and the robot base. Debug points and poses are emitted through a
//! [`debug_publisher::DebugPublisher`].
//!
//! # Example
//!
//! ```
//! use rs_robotic_arms::factory::{ProtocolVersion, RoboticArmFactory};
//! use rs_robotic_arms::kinematic_traits::IkSolver;
//!
//! let factory = RoboticArmFactory::new();
//! let arm = factory.create_robotic_arm("ur5_robot", ProtocolVersion::Ros2Humble).unwrap();
//! let joints = [0.3, -1.2, 1.1, -0.4, 0.9, 0.2];
//! let pose = arm.forward_kinematics(&joints, IkSolver::Geometric).unwrap();
//! for solution in arm.inverse_kinematics(&pose, IkSolver::Geometric) {
//!     let check = arm.forward_kinematics(&solution, IkSolver::Geometric).unwrap();
//!     assert!((check.translation.vector - pose.translation.vector).norm() < 1e-5);
//! }
//! ```
//!
//! With the default `allow_filesystem` feature, robots and the waypoint handling can be
//! configured from YAML and chains can be read from URDF.

pub mod arm_error;
pub mod kinematic_traits;
pub mod joint_state;
pub mod constraints;

pub mod parameters;
pub mod parameters_robots;
pub mod arm_config;

#[path = "utils/utils.rs"]
pub mod utils;

#[path = "utils/math_tools.rs"]
pub mod math_tools;

pub mod geometric;
pub mod chain;
pub mod jacobian;
pub mod trac;

pub mod robotic_arm;
pub mod factory;

pub mod waypoint_parser;
pub mod roi;
pub mod debug_publisher;
pub mod subtask;

#[cfg(feature = "allow_filesystem")]
pub mod config_from_file;

#[cfg(feature = "allow_filesystem")]
pub mod urdf;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
