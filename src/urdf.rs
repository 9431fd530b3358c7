//! Supports extracting the serial chain between two links from URDF (optional)

extern crate sxd_document;

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs::read_to_string;
use std::path::Path;
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use regex::Regex;
use sxd_document::{dom, parser, QName};
use tracing::{debug, warn};
use crate::arm_error::ArmError;
use crate::chain::{ChainJoint, SerialChain};
use crate::constraints::JointLimits;

/// Read the URDF file and build the chain from `base_link` to `tip_link`.
///
/// # Example
/// ```
/// let chain = rs_robotic_arms::urdf::chain_from_urdf_file(
///     "src/tests/data/ur5.urdf", "base_link_inertia", "virtual_target").unwrap();
/// assert_eq!(chain.len(), 6);
/// ```
pub fn chain_from_urdf_file<P: AsRef<Path>>(path: P, base_link: &str, tip_link: &str) -> Result<SerialChain, ArmError> {
    let xml_content = read_to_string(path)?;
    chain_from_urdf(&xml_content, base_link, tip_link)
}

/// Build the chain of movable joints from `base_link` to `tip_link`. Fixed joints on the way
/// are folded into the origin of the next movable joint (or into the tip transform).
/// Only revolute and continuous joints are supported as movable; continuous joints and
/// revolute joints without readable limits get a full turn in both directions.
pub fn chain_from_urdf(xml_content: &str, base_link: &str, tip_link: &str) -> Result<SerialChain, ArmError> {
    let joints = process_joints(xml_content)?;
    let path = path_between(&joints, base_link, tip_link)?;

    let mut pending = Isometry3::identity();
    let mut chain_joints = Vec::new();
    let (mut from, mut to) = (Vec::new(), Vec::new());
    for joint in path {
        match joint.joint_type.as_str() {
            "fixed" => {
                pending *= joint.origin;
            }
            "revolute" | "continuous" => {
                chain_joints.push(ChainJoint {
                    name: joint.name.clone(),
                    origin: pending * joint.origin,
                    axis: joint.axis,
                });
                pending = Isometry3::identity();
                let (lower, upper) = match (joint.joint_type.as_str(), joint.limits) {
                    ("revolute", Some(limits)) => limits,
                    _ => (-2.0 * PI, 2.0 * PI),
                };
                from.push(lower);
                to.push(upper);
            }
            other => {
                return Err(ArmError::KinematicsConfigurationError(
                    format!("Joint {} has unsupported type {}", joint.name, other)));
            }
        }
    }

    debug!("URDF chain {} -> {}: {} movable joints", base_link, tip_link, chain_joints.len());
    SerialChain::new(chain_joints, pending, JointLimits::new(from, to)?)
}

#[derive(Debug, Clone, PartialEq)]
struct JointData {
    name: String,
    joint_type: String,
    parent: String,
    child: String,
    origin: Isometry3<f64>,
    axis: Unit<Vector3<f64>>,
    limits: Option<(f64, f64)>,
}

/// Joints from the tip up to the base, returned in base to tip order.
fn path_between<'a>(joints: &'a [JointData], base_link: &str, tip_link: &str) -> Result<Vec<&'a JointData>, ArmError> {
    let by_child: HashMap<&str, &JointData> = joints.iter().map(|j| (j.child.as_str(), j)).collect();
    let mut path = Vec::new();
    let mut link = tip_link;
    while link != base_link {
        let joint = by_child.get(link).ok_or_else(|| ArmError::MissingField(
            format!("No chain from {} to {} (link {} has no parent joint)", base_link, tip_link, link)))?;
        if path.len() > joints.len() {
            return Err(ArmError::XmlProcessingError("Joints form a cycle".to_string()));
        }
        path.push(*joint);
        link = joint.parent.as_str();
    }
    path.reverse();
    Ok(path)
}

fn process_joints(xml: &str) -> Result<Vec<JointData>, ArmError> {
    let package = parser::parse(xml)
        .map_err(|e| ArmError::XmlProcessingError(format!("Failed to parse XML: {:?}", e)))?;
    let document = package.as_document();

    // Access the root element
    let root_element = document.root().children().into_iter()
        .find_map(|e| e.element())
        .ok_or_else(|| ArmError::XmlProcessingError("No root element found".to_string()))?;

    let mut joints = Vec::new();
    collect_joints(root_element, &mut joints)?;
    Ok(joints)
}

// Recursive function to collect joint data
fn collect_joints(element: dom::Element, joints: &mut Vec<JointData>) -> Result<(), ArmError> {
    let joint_tag = QName::new("joint");

    for child in element.children().into_iter().filter_map(|e| e.element()) {
        if child.name() == joint_tag {
            joints.push(read_joint(child)?);
        }
        collect_joints(child, joints)?;
    }
    Ok(())
}

fn read_joint(element: dom::Element) -> Result<JointData, ArmError> {
    let find = |tag: &str| {
        let name = QName::new(tag);
        element.children().into_iter()
            .find_map(|e| e.element().filter(|el| el.name() == name))
    };
    let link_of = |tag: &str| -> Result<String, ArmError> {
        find(tag)
            .and_then(|el| el.attribute("link"))
            .map(|attr| attr.value().to_string())
            .ok_or_else(|| ArmError::MissingField(format!("{} link of joint", tag)))
    };

    let name = element.attribute("name")
        .map(|attr| attr.value().to_string())
        .unwrap_or_else(|| "Unnamed".to_string());
    let joint_type = element.attribute("type")
        .map(|attr| attr.value().to_string())
        .unwrap_or_else(|| "fixed".to_string());

    let origin = find("origin").map_or(Ok(Isometry3::identity()), get_origin)?;
    let axis = find("axis").map_or(Ok(Vector3::x_axis()), get_axis)?;

    let limits = match find("limit").map(get_limits).transpose() {
        Ok(limits) => limits,
        Err(e) => {
            warn!("Joint limits defined but not readable for {}: {}", name, e);
            None
        }
    };

    Ok(JointData {
        parent: link_of("parent")?,
        child: link_of("child")?,
        name,
        joint_type,
        origin,
        axis,
        limits,
    })
}

fn parse_triple(text: &str, parse: fn(&str) -> Result<f64, ArmError>) -> Result<[f64; 3], ArmError> {
    let values = text.split_whitespace().map(parse).collect::<Result<Vec<_>, _>>()?;
    <[f64; 3]>::try_from(values).map_err(|v| ArmError::InvalidLength { expected: 3, found: v.len() })
}

fn parse_number(text: &str) -> Result<f64, ArmError> {
    text.parse().map_err(|_| ArmError::ParseError(format!("Not a number: {}", text)))
}

fn get_origin(element: dom::Element) -> Result<Isometry3<f64>, ArmError> {
    let [x, y, z] = element.attribute("xyz")
        .map_or(Ok([0.0; 3]), |attr| parse_triple(attr.value(), parse_number))?;
    let [roll, pitch, yaw] = element.attribute("rpy")
        .map_or(Ok([0.0; 3]), |attr| parse_triple(attr.value(), parse_angle))?;
    Ok(Isometry3::from_parts(Translation3::new(x, y, z),
                             UnitQuaternion::from_euler_angles(roll, pitch, yaw)))
}

fn get_axis(element: dom::Element) -> Result<Unit<Vector3<f64>>, ArmError> {
    let axis_attr = element.attribute("xyz")
        .ok_or_else(|| ArmError::MissingField("'xyz' attribute of the axis".into()))?;
    let [x, y, z] = parse_triple(axis_attr.value(), parse_number)?;
    Unit::try_new(Vector3::new(x, y, z), 1e-12)
        .ok_or_else(|| ArmError::KinematicsConfigurationError(format!("Zero joint axis: {}", axis_attr.value())))
}

/// Angle in radians, either plain or as a xacro expression: `${radians(-90)}`, `${pi}`,
/// `${-pi/2}`, `${2*pi}`.
fn parse_angle(attr_value: &str) -> Result<f64, ArmError> {
    let radians = Regex::new(r"^\$\{radians\((-?\d+(\.\d+)?)\)\}$")
        .map_err(|_| ArmError::ParseError("Invalid regex pattern".to_string()))?;
    let pi = Regex::new(r"^\$\{\s*(-)?\s*(?:(\d+(?:\.\d+)?)\s*\*\s*)?pi\s*(?:/\s*(\d+(?:\.\d+)?))?\s*\}$")
        .map_err(|_| ArmError::ParseError("Invalid regex pattern".to_string()))?;
    let wrong = || ArmError::WrongAngle(attr_value.to_string());

    if let Some(caps) = radians.captures(attr_value) {
        let degrees: f64 = caps.get(1).ok_or_else(wrong)?.as_str().parse().map_err(|_| wrong())?;
        Ok(degrees.to_radians())
    } else if let Some(caps) = pi.captures(attr_value) {
        let sign = if caps.get(1).is_some() { -1.0 } else { 1.0 };
        let factor: f64 = caps.get(2).map_or(Ok(1.0), |m| m.as_str().parse()).map_err(|_| wrong())?;
        let divisor: f64 = caps.get(3).map_or(Ok(1.0), |m| m.as_str().parse()).map_err(|_| wrong())?;
        Ok(sign * factor * PI / divisor)
    } else {
        // Plain number is in radians
        attr_value.trim().parse().map_err(|_| wrong())
    }
}

fn get_limits(element: dom::Element) -> Result<(f64, f64), ArmError> {
    let lower_attr = element.attribute("lower")
        .ok_or_else(|| ArmError::MissingField("lower limit not found".into()))?
        .value();
    let lower_limit = parse_angle(lower_attr)?;

    let upper_attr = element.attribute("upper")
        .ok_or_else(|| ArmError::MissingField("upper limit not found".into()))?
        .value();
    let upper_limit = parse_angle(upper_attr)?;

    Ok((lower_limit, upper_limit))
}
