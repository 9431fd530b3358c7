//! Joint limits of the robot

use std::f64::consts::PI;
use rand::Rng;
use crate::arm_error::{check_length, ArmError};

const TWO_PI: f64 = 2.0 * PI;

#[derive(Debug, Clone, PartialEq)]
pub struct JointLimits {
    /// Lower limit of every joint, radians.
    pub from: Vec<f64>,

    /// Upper limit of every joint, radians. Ranges of 2π or more are not constraining.
    pub to: Vec<f64>,
}

impl JointLimits {
    pub fn new(from: Vec<f64>, to: Vec<f64>) -> Result<Self, ArmError> {
        check_length(to.len(), from.len())?;
        for (i, (f, t)) in from.iter().zip(&to).enumerate() {
            if !(f.is_finite() && t.is_finite()) || f > t {
                return Err(ArmError::KinematicsConfigurationError(
                    format!("Joint {} has invalid limits [{}, {}]", i, f, t)));
            }
        }
        Ok(JointLimits { from, to })
    }

    /// Same symmetric range for all joints.
    pub fn symmetric(n: usize, range: f64) -> Self {
        JointLimits { from: vec![-range; n], to: vec![range; n] }
    }

    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// Shift the angle by full turns into [from, to] of the given joint, if possible.
    pub fn wrap_joint(&self, joint: usize, angle: f64) -> Option<f64> {
        let (from, to) = (self.from[joint], self.to[joint]);
        if angle >= from && angle <= to {
            return Some(angle);
        }
        let wrapped = from + (angle - from).rem_euclid(TWO_PI);
        if wrapped <= to { Some(wrapped) } else { None }
    }

    /// Bring all angles into the limits by full turns. None if some joint cannot be placed.
    pub fn wrap(&self, angles: &[f64]) -> Option<Vec<f64>> {
        if angles.len() != self.len() {
            return None;
        }
        angles.iter().enumerate()
            .map(|(i, &a)| self.wrap_joint(i, a))
            .collect()
    }

    /// Uniformly random joint positions inside the limits.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.from.iter().zip(&self.to)
            .map(|(&f, &t)| if f < t { rng.gen_range(f..t) } else { f })
            .collect()
    }
}
