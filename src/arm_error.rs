//! Error handling for robot construction, configuration loading and precondition checks

use std::io;

/// Unified error for everything that can go wrong before or around a kinematics call.
/// Not finding an IK solution is not an error: it is reported as an empty `Solutions`.
#[derive(Debug)]
pub enum ArmError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    WrongAngle(String),
    InvalidLength { expected: usize, found: usize },
    XmlProcessingError(String),
    KinematicsConfigurationError(String),
    UnknownRobot { name: String, allowed: Vec<String> },
    UnknownProtocol(String),
    UnsupportedProtocol { name: String, protocol: String },
}

impl std::fmt::Display for ArmError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ArmError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ArmError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ArmError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ArmError::WrongAngle(ref msg) =>
                write!(f, "Wrong angle representation: {}", msg),
            ArmError::InvalidLength { expected, found } =>
                write!(f, "Invalid Length: expected {}, found {}", expected, found),
            ArmError::XmlProcessingError(ref err) =>
                write!(f, "XML Processing Error: {}", err),
            ArmError::KinematicsConfigurationError(ref err) =>
                write!(f, "Kinematics Configuration Error: {}", err),
            ArmError::UnknownRobot { ref name, ref allowed } =>
                write!(f, "Invalid robotic arm type: {}. Allowed values are {}.", name, allowed.join(", ")),
            ArmError::UnknownProtocol(ref version) =>
                write!(f, "Unknown protocol version: {}", version),
            ArmError::UnsupportedProtocol { ref name, ref protocol } =>
                write!(f, "Robotic arm {} is not available for protocol {}", name, protocol),
        }
    }
}

impl std::error::Error for ArmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArmError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ArmError {
    fn from(err: io::Error) -> Self {
        ArmError::IoError(err)
    }
}

/// Fail fast if a joint vector does not match the joint count of the robot.
pub(crate) fn check_length(found: usize, expected: usize) -> Result<(), ArmError> {
    if found != expected {
        return Err(ArmError::InvalidLength { expected, found });
    }
    Ok(())
}
