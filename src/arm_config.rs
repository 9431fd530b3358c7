//! Static description of a robotic arm: joint names, home position, frames and IK settings

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use crate::arm_error::ArmError;

/// How the numerical solver picks a result, as in TRAC-IK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveType {
    /// Return the first converged solution.
    Speed,
    /// Search until the timeout and return the converged solution closest to the seed.
    Distance,
}

impl FromStr for SolveType {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" => Ok(SolveType::Speed),
            "distance" => Ok(SolveType::Distance),
            _ => Err(ArmError::ParseError(format!("Unknown solve type: {}", s))),
        }
    }
}

impl fmt::Display for SolveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveType::Speed => write!(f, "Speed"),
            SolveType::Distance => write!(f, "Distance"),
        }
    }
}

/// Settings of the numerical ("trac") solver.
#[derive(Debug, Clone, PartialEq)]
pub struct IkConfig {
    pub solve_type: SolveType,

    /// Convergence threshold on the pose error (meters and radians combined).
    pub error: f64,

    /// Time budget of a single solve. The first attempt always runs to completion.
    pub timeout: Duration,

    /// Iterations of a single damped least squares descent before restarting.
    pub max_iterations: usize,

    /// Seed of the random restarts, so that results are reproducible.
    pub seed: u64,
}

impl Default for IkConfig {
    fn default() -> Self {
        IkConfig {
            solve_type: SolveType::Distance,
            error: 1e-6,
            timeout: Duration::from_millis(10),
            max_iterations: 100,
            seed: 42,
        }
    }
}

/// Metadata of the arm. Joint names and the home joint are in the native (driver) ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmConfig {
    pub robot_name: String,
    pub path_urdf: Option<String>,
    pub joint_names: Vec<String>,
    pub original_home_joint: Vec<f64>,
    pub reference_frame: String,
    pub tip_link: String,
    pub ik: IkConfig,
}

/// Native joint ordering of Universal Robots drivers.
pub const UR_JOINT_NAMES: [&str; 6] = [
    "elbow_joint",
    "shoulder_lift_joint",
    "shoulder_pan_joint",
    "wrist_1_joint",
    "wrist_2_joint",
    "wrist_3_joint",
];

impl ArmConfig {
    /// Configuration of a Universal Robots arm with the standard joint names and frames.
    pub fn universal_robot(robot_name: &str) -> Self {
        ArmConfig {
            robot_name: robot_name.to_string(),
            path_urdf: None,
            joint_names: UR_JOINT_NAMES.iter().map(|s| s.to_string()).collect(),
            original_home_joint: vec![1.57, -1.57, 0.0, -1.57, -1.57, 0.0],
            reference_frame: "base_link_inertia".to_string(),
            tip_link: "virtual_target".to_string(),
            ik: IkConfig::default(),
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_names.len()
    }

    /// Fail if names and home joint disagree in length, or a name is repeated.
    pub fn validate(&self) -> Result<(), ArmError> {
        if self.joint_names.is_empty() {
            return Err(ArmError::MissingField("joint_names".to_string()));
        }
        if self.original_home_joint.len() != self.joint_names.len() {
            return Err(ArmError::InvalidLength {
                expected: self.joint_names.len(),
                found: self.original_home_joint.len(),
            });
        }
        for (i, name) in self.joint_names.iter().enumerate() {
            if self.joint_names[..i].contains(name) {
                return Err(ArmError::KinematicsConfigurationError(
                    format!("Joint {} is listed twice", name)));
            }
        }
        if self.ik.error.is_nan() || self.ik.error <= 0.0 || self.ik.max_iterations == 0 {
            return Err(ArmError::KinematicsConfigurationError(
                "IK error must be positive and max_iterations non-zero".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for ArmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Robot name: {}", self.robot_name)?;
        writeln!(f, "URDF Path: {}", self.path_urdf.as_deref().unwrap_or("(built-in chain)"))?;
        writeln!(f, "Number of joints: {}", self.joint_count())?;
        writeln!(f, "Joint names: {}", self.joint_names.join(" "))?;
        writeln!(f, "Tip link: {}", self.tip_link)?;
        writeln!(f, "Reference frame: {}", self.reference_frame)?;
        let home: Vec<String> = self.original_home_joint.iter().map(|j| j.to_string()).collect();
        write!(f, "Original home joint: {}", home.join(" "))
    }
}
