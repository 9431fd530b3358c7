//! Supports reading robot and subtask configuration from YAML file (optional)

use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;
use nalgebra::Vector3;
use tracing::{info, warn};
use yaml_rust2::{Yaml, YamlLoader};
use crate::arm_config::{ArmConfig, IkConfig, UR_JOINT_NAMES};
use crate::arm_error::ArmError;
use crate::debug_publisher::BurstPolicy;
use crate::factory::{ProtocolVersion, RoboticArmFactory};
use crate::kinematic_traits::RoboticArm;
use crate::parameters::ur_kinematics::Parameters;
use crate::robotic_arm::RoboticArmUr;
use crate::subtask::SubtaskConfig;
use crate::urdf::chain_from_urdf_file;

/// Name of the top level section that configures the waypoint subtask. All other top level
/// keys are robot names.
pub const SUBTASK_SECTION: &str = "subtask";

/// Locate the configuration file. The shared `<root>/../config/<file>` wins over the
/// package local `<root>/config/<file>`. If neither exists, the local path is returned
/// so that the error mentions where the file was expected.
pub fn resolve_config_path<P: AsRef<Path>>(root: P, file_name: &str) -> PathBuf {
    let root = root.as_ref();
    let general = root.join("..").join("config").join(file_name);
    if general.is_file() {
        info!("Using general configuration {}", general.display());
        return general;
    }
    let local = root.join("config").join(file_name);
    info!("Using local configuration {}", local.display());
    local
}

/// One robot section of the configuration file.
#[derive(Debug, Clone)]
pub struct RobotEntry {
    pub config: ArmConfig,
    pub parameters: Parameters,
    pub protocols: Vec<ProtocolVersion>,
}

fn load_document(contents: &str) -> Result<Yaml, ArmError> {
    let mut docs = YamlLoader::load_from_str(contents)
        .map_err(|e| ArmError::ParseError(format!("{}", e)))?;
    if docs.is_empty() {
        return Err(ArmError::ParseError("Empty YAML document".to_string()));
    }
    Ok(docs.swap_remove(0))
}

fn as_number(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|v| v as f64))
}

/// Number, or angle given as `deg(x)`.
fn as_angle(value: &Yaml) -> Result<f64, ArmError> {
    if let Some(number) = as_number(value) {
        return Ok(number);
    }
    let text = value.as_str()
        .ok_or_else(|| ArmError::ParseError(format!("Expected a number, found {:?}", value)))?;
    text.trim().strip_prefix("deg(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|degrees| degrees.trim().parse::<f64>().ok())
        .map(f64::to_radians)
        .ok_or_else(|| ArmError::WrongAngle(text.to_string()))
}

fn number_field(node: &Yaml, key: &str) -> Result<Option<f64>, ArmError> {
    match &node[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        value => as_number(value).map(Some)
            .ok_or_else(|| ArmError::ParseError(format!("{} must be a number", key))),
    }
}

fn string_field(node: &Yaml, key: &str) -> Result<Option<String>, ArmError> {
    match &node[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        value => value.as_str().map(|s| Some(s.to_string()))
            .ok_or_else(|| ArmError::ParseError(format!("{} must be a string", key))),
    }
}

fn list_field<T>(node: &Yaml, key: &str, item: impl Fn(&Yaml) -> Result<T, ArmError>)
                 -> Result<Option<Vec<T>>, ArmError> {
    match &node[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Array(items) => items.iter().map(item).collect::<Result<Vec<_>, _>>().map(Some),
        _ => Err(ArmError::ParseError(format!("{} must be a list", key))),
    }
}

fn vector_field(node: &Yaml, key: &str) -> Result<Option<Vector3<f64>>, ArmError> {
    let values = list_field(node, key, |v| as_number(v)
        .ok_or_else(|| ArmError::ParseError(format!("{} must contain numbers", key))))?;
    values.map(|v| match v.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(ArmError::InvalidLength { expected: 3, found: v.len() }),
    }).transpose()
}

fn seconds(value: f64, key: &str) -> Result<Duration, ArmError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ArmError::ParseError(format!("{} must be a non-negative number of seconds: {}", key, e)))
}

fn read_parameters(node: &Yaml) -> Result<Parameters, ArmError> {
    match node {
        Yaml::String(model) => Parameters::by_model(model)
            .ok_or_else(|| ArmError::KinematicsConfigurationError(format!("Unknown robot model {}", model))),
        Yaml::Hash(_) => {
            let field = |key: &str| number_field(node, key)?
                .ok_or_else(|| ArmError::MissingField(format!("dh_parameters.{}", key)));
            Ok(Parameters {
                d1: field("d1")?,
                a2: field("a2")?,
                a3: field("a3")?,
                d4: field("d4")?,
                d5: field("d5")?,
                d6: field("d6")?,
            })
        }
        _ => Err(ArmError::MissingField("dh_parameters".to_string())),
    }
}

fn read_ik(node: &Yaml) -> Result<IkConfig, ArmError> {
    let mut ik = IkConfig::default();
    if let Some(solve_type) = string_field(node, "solve_type")? {
        ik.solve_type = solve_type.parse()?;
    }
    if let Some(error) = number_field(node, "error")? {
        ik.error = error;
    }
    if let Some(timeout) = number_field(node, "timeout")? {
        ik.timeout = seconds(timeout, "timeout")?;
    }
    if let Some(max_iterations) = node["max_iterations"].as_i64() {
        ik.max_iterations = usize::try_from(max_iterations)
            .map_err(|_| ArmError::ParseError("max_iterations must be positive".to_string()))?;
    }
    if let Some(seed) = node["seed"].as_i64() {
        ik.seed = seed as u64;
    }
    Ok(ik)
}

/// Robot section. Missing values fall back to the Universal Robots defaults; the DH
/// parameters fall back to the preset of the robot name, if there is one.
fn read_robot(robot_name: &str, node: &Yaml) -> Result<RobotEntry, ArmError> {
    let mut config = ArmConfig::universal_robot(robot_name);
    config.path_urdf = string_field(node, "path_urdf")?;
    if let Some(names) = list_field(node, "joint_names", |v| v.as_str().map(str::to_string)
        .ok_or_else(|| ArmError::ParseError("joint_names must be strings".to_string())))? {
        config.joint_names = names;
    }
    if let Some(home) = list_field(node, "original_home_joint", as_angle)? {
        config.original_home_joint = home;
    }
    if let Some(frame) = string_field(node, "reference_frame")? {
        config.reference_frame = frame;
    }
    if let Some(tip) = string_field(node, "tip_link")? {
        config.tip_link = tip;
    }
    if !node["ik"].is_badvalue() {
        config.ik = read_ik(&node["ik"])?;
    }
    config.validate()?;

    let parameters = match &node["dh_parameters"] {
        Yaml::BadValue => Parameters::by_model(robot_name).ok_or_else(||
            ArmError::MissingField(format!("dh_parameters of {}", robot_name)))?,
        dh => read_parameters(dh)?,
    };

    let protocols = list_field(node, "protocols", |v| v.as_str()
        .ok_or_else(|| ArmError::UnknownProtocol(format!("{:?}", v)))
        .and_then(|s| s.parse::<ProtocolVersion>()))?
        .unwrap_or_else(|| ProtocolVersion::ALL.to_vec());

    Ok(RobotEntry { config, parameters, protocols })
}

/// Read all robot sections of the YAML text:
/// ```yaml
/// ur5_robot:
///   path_urdf: src/tests/data/ur5.urdf   # optional, DH derived chain otherwise
///   joint_names: [elbow_joint, shoulder_lift_joint, shoulder_pan_joint,
///                 wrist_1_joint, wrist_2_joint, wrist_3_joint]
///   original_home_joint: [1.57, -1.57, 0.0, -1.57, -1.57, 0.0]
///   reference_frame: base_link_inertia
///   tip_link: virtual_target
///   dh_parameters: ur5                   # preset, or a map with d1, a2, a3, d4, d5, d6
///   protocols: [noetic, humble]
///   ik: { solve_type: Distance, error: 1.0e-6, timeout: 0.01, max_iterations: 100, seed: 42 }
/// ```
/// Angles of the home joint may be written as `deg(-90)`.
pub fn load_robots(contents: &str) -> Result<Vec<RobotEntry>, ArmError> {
    let doc = load_document(contents)?;
    let hash = doc.as_hash()
        .ok_or_else(|| ArmError::ParseError("Top level of the configuration must be a map".to_string()))?;
    let mut robots = Vec::new();
    for (key, node) in hash {
        let name = key.as_str()
            .ok_or_else(|| ArmError::ParseError(format!("Robot name must be a string: {:?}", key)))?;
        if name == SUBTASK_SECTION {
            continue;
        }
        robots.push(read_robot(name, node)?);
    }
    Ok(robots)
}

impl ArmConfig {
    /// Configuration of the named robot from the YAML file, see [`load_robots`].
    pub fn from_yaml_file<P: AsRef<Path>>(path: P, robot_name: &str) -> Result<Self, ArmError> {
        let contents = read_to_string(path)?;
        load_robots(&contents)?
            .into_iter()
            .find(|robot| robot.config.robot_name == robot_name)
            .map(|robot| robot.config)
            .ok_or_else(|| ArmError::MissingField(format!("Robot section {}", robot_name)))
    }
}

fn read_burst(node: &Yaml, fallback: BurstPolicy) -> Result<BurstPolicy, ArmError> {
    if node.is_badvalue() {
        return Ok(fallback);
    }
    let count = match node["count"].as_i64() {
        Some(count) => usize::try_from(count)
            .map_err(|_| ArmError::ParseError("count must not be negative".to_string()))?,
        None => fallback.count,
    };
    let delay = match number_field(node, "delay")? {
        Some(delay) => seconds(delay, "delay")?,
        None => fallback.delay,
    };
    Ok(BurstPolicy { count, delay })
}

impl SubtaskConfig {
    /// Read the `subtask` section. Without the section all defaults apply.
    /// ```yaml
    /// subtask:
    ///   robot_pos: [0.0, 0.0, 0.0]
    ///   ref_vector: [1.0, 0.0, 0.0]
    ///   theta: deg(0)
    ///   frame_id: base_link
    ///   point_burst: { count: 3, delay: 0.05 }
    ///   pose_burst: { count: 3, delay: 0.2 }
    /// ```
    pub fn from_yaml_str(contents: &str) -> Result<Self, ArmError> {
        let doc = load_document(contents)?;
        let node = &doc[SUBTASK_SECTION];
        let mut config = SubtaskConfig::default();
        if node.is_badvalue() {
            warn!("No {} section, using defaults", SUBTASK_SECTION);
            return Ok(config);
        }
        if let Some(robot_pos) = vector_field(node, "robot_pos")? {
            config.robot_pos = robot_pos;
        }
        if let Some(ref_vector) = vector_field(node, "ref_vector")? {
            config.ref_vector = ref_vector;
        }
        if !node["theta"].is_badvalue() {
            config.theta = as_angle(&node["theta"])?;
        }
        if let Some(frame_id) = string_field(node, "frame_id")? {
            config.frame_id = frame_id;
        }
        config.point_burst = read_burst(&node["point_burst"], config.point_burst)?;
        config.pose_burst = read_burst(&node["pose_burst"], config.pose_burst)?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ArmError> {
        Self::from_yaml_str(&read_to_string(path)?)
    }
}

impl RoboticArmFactory {
    /// Built-in robots plus the robots of the configuration file. A robot of the file replaces
    /// the built-in one of the same name. URDF paths are resolved relative to the working
    /// directory first, then to the directory of the configuration file. URDF chains are read
    /// here so that broken files are reported before any arm is created.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ArmError> {
        let path = path.as_ref();
        let robots = load_robots(&read_to_string(path)?)?;
        let mut factory = RoboticArmFactory::new();

        for RobotEntry { config, parameters, protocols } in robots {
            let chain = match &config.path_urdf {
                Some(urdf) => {
                    let mut urdf_path = PathBuf::from(urdf);
                    if !urdf_path.is_file() {
                        if let Some(dir) = path.parent() {
                            urdf_path = dir.join(urdf);
                        }
                    }
                    Some(chain_from_urdf_file(&urdf_path, &config.reference_frame, &config.tip_link)?)
                }
                None => None,
            };
            if chain.is_none() && config.joint_names.iter().any(|n| !UR_JOINT_NAMES.contains(&n.as_str())) {
                return Err(ArmError::KinematicsConfigurationError(format!(
                    "{} uses custom joint names and needs path_urdf", config.robot_name)));
            }
            info!("Registering {} from {}", config.robot_name, path.display());

            let name = config.robot_name.clone();
            factory.register_robotic_arm(&name, &protocols, move |protocol| {
                let arm = match &chain {
                    Some(chain) => RoboticArmUr::with_chain(config.clone(), parameters, chain.clone(), protocol)?,
                    None => RoboticArmUr::new(config.clone(), parameters, protocol)?,
                };
                Ok(Box::new(arm) as Box<dyn RoboticArm>)
            });
        }
        Ok(factory)
    }
}
