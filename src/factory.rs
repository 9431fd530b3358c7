//! Selects the robotic arm implementation by model name and protocol version

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use crate::arm_config::ArmConfig;
use crate::arm_error::ArmError;
use crate::kinematic_traits::RoboticArm;
use crate::parameters::ur_kinematics::Parameters;
use crate::robotic_arm::RoboticArmUr;

/// Middleware version the arm is driven through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolVersion {
    Ros1Noetic,
    Ros2Humble,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 2] = [ProtocolVersion::Ros1Noetic, ProtocolVersion::Ros2Humble];
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::Ros1Noetic => write!(f, "noetic"),
            ProtocolVersion::Ros2Humble => write!(f, "humble"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = ArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noetic" | "ros1" => Ok(ProtocolVersion::Ros1Noetic),
            "humble" | "ros2" => Ok(ProtocolVersion::Ros2Humble),
            _ => Err(ArmError::UnknownProtocol(s.to_string())),
        }
    }
}

/// Constructor of a registered arm.
pub type ArmConstructor = Box<dyn Fn(ProtocolVersion) -> Result<Box<dyn RoboticArm>, ArmError> + Send + Sync>;

struct Registration {
    versions: Vec<ProtocolVersion>,
    constructor: ArmConstructor,
}

pub struct RoboticArmFactory {
    registry: BTreeMap<String, Registration>,
}

/// Built-in Universal Robots models.
const BUILT_IN: [(&str, fn() -> Parameters); 4] = [
    ("ur3e_robot", Parameters::ur3e),
    ("ur5_robot", Parameters::ur5),
    ("ur5e_robot", Parameters::ur5e),
    ("ur10e_robot", Parameters::ur10e),
];

impl RoboticArmFactory {
    /// Factory with all built-in robots registered for all protocol versions.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        for (name, parameters) in BUILT_IN {
            factory.register_robotic_arm(name, &ProtocolVersion::ALL, move |protocol| {
                let arm = RoboticArmUr::new(ArmConfig::universal_robot(name), parameters(), protocol)?;
                Ok(Box::new(arm) as Box<dyn RoboticArm>)
            });
        }
        factory
    }

    /// Factory without any registrations.
    pub fn empty() -> Self {
        RoboticArmFactory { registry: BTreeMap::new() }
    }

    /// Register (or replace) the constructor of the named arm, supported for the listed versions.
    pub fn register_robotic_arm<F>(&mut self, name: &str, versions: &[ProtocolVersion], constructor: F)
    where
        F: Fn(ProtocolVersion) -> Result<Box<dyn RoboticArm>, ArmError> + Send + Sync + 'static,
    {
        self.registry.insert(name.to_string(), Registration {
            versions: versions.to_vec(),
            constructor: Box::new(constructor),
        });
    }

    /// Create the arm. Unknown names and unsupported versions are errors, no instance is returned.
    pub fn create_robotic_arm(&self, name: &str, protocol: ProtocolVersion) -> Result<Box<dyn RoboticArm>, ArmError> {
        let registration = self.registry.get(name).ok_or_else(|| ArmError::UnknownRobot {
            name: name.to_string(),
            allowed: self.robotic_arm_types(),
        })?;
        if !registration.versions.contains(&protocol) {
            return Err(ArmError::UnsupportedProtocol {
                name: name.to_string(),
                protocol: protocol.to_string(),
            });
        }
        let arm = (registration.constructor)(protocol)?;
        info!("Created robotic arm {} for {}", name, protocol);
        Ok(arm)
    }

    /// Registered names, sorted.
    pub fn robotic_arm_types(&self) -> Vec<String> {
        self.registry.keys().cloned().collect()
    }

    pub fn supported_versions(&self, name: &str) -> Option<&[ProtocolVersion]> {
        self.registry.get(name).map(|r| r.versions.as_slice())
    }
}

impl Default for RoboticArmFactory {
    fn default() -> Self {
        Self::new()
    }
}
