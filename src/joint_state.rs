//! Joint state tuples and the permutation reconciling joint numbering conventions

use crate::arm_error::{check_length, ArmError};

/// Position, velocity and torque of every joint, as delivered by a robot driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointState {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub torque: Vec<f64>,
}

impl JointState {
    pub fn new(position: Vec<f64>, velocity: Vec<f64>, torque: Vec<f64>) -> Self {
        JointState { position, velocity, torque }
    }

    /// Joint state at rest with the given positions.
    pub fn at_rest(position: Vec<f64>) -> Self {
        let n = position.len();
        JointState { position, velocity: vec![0.0; n], torque: vec![0.0; n] }
    }

    /// Check that all three channels have the expected number of joints.
    pub fn check_length(&self, expected: usize) -> Result<(), ArmError> {
        check_length(self.position.len(), expected)?;
        check_length(self.velocity.len(), expected)?;
        check_length(self.torque.len(), expected)
    }
}

/// Fixed index permutation: element `i` of the output is element `order[i]` of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointPermutation {
    order: Vec<usize>,
}

impl JointPermutation {
    /// Permutation leaving every joint in place.
    pub fn identity(n: usize) -> Self {
        JointPermutation { order: (0..n).collect() }
    }

    /// Permutation exchanging joints `a` and `b`. Such a permutation is an involution.
    pub fn swap(n: usize, a: usize, b: usize) -> Self {
        let mut order: Vec<usize> = (0..n).collect();
        order.swap(a, b);
        JointPermutation { order }
    }

    /// Build from explicit order, rejecting anything that is not a permutation of 0..n.
    pub fn from_order(order: Vec<usize>) -> Result<Self, ArmError> {
        let mut seen = vec![false; order.len()];
        for &i in &order {
            if i >= order.len() || seen[i] {
                return Err(ArmError::KinematicsConfigurationError(
                    format!("{:?} is not a joint permutation", order)));
            }
            seen[i] = true;
        }
        Ok(JointPermutation { order })
    }

    /// Derive the permutation mapping `from` joint names into `to` joint names.
    pub fn between(from: &[String], to: &[String]) -> Result<Self, ArmError> {
        check_length(from.len(), to.len())?;
        let order = to.iter()
            .map(|name| from.iter().position(|n| n == name)
                .ok_or_else(|| ArmError::MissingField(format!("joint {}", name))))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_order(order)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True if applying the permutation twice restores the original order.
    pub fn is_involution(&self) -> bool {
        self.order.iter().enumerate().all(|(i, &j)| self.order[j] == i)
    }

    pub fn inverse(&self) -> Self {
        let mut order = vec![0; self.order.len()];
        for (i, &j) in self.order.iter().enumerate() {
            order[j] = i;
        }
        JointPermutation { order }
    }

    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>, ArmError> {
        check_length(values.len(), self.order.len())?;
        Ok(self.order.iter().map(|&i| values[i]).collect())
    }

    /// Apply to all channels of the joint state.
    pub fn apply_state(&self, state: &JointState) -> Result<JointState, ArmError> {
        Ok(JointState {
            position: self.apply(&state.position)?,
            velocity: self.apply(&state.velocity)?,
            torque: self.apply(&state.torque)?,
        })
    }
}
