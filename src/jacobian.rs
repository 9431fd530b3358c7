//! Numerical Jacobian of a serial chain

extern crate nalgebra as na;
use na::{DMatrix, DVector, Vector6};
use rayon::prelude::*;
use crate::kinematic_traits::Pose;

/// Struct representing the Jacobian matrix
pub struct Jacobian {
    /// A 6xN matrix representing the Jacobian
    ///
    /// The Jacobian matrix maps the joint velocities to the end-effector velocities.
    /// Each column corresponds to a joint, and each row corresponds to a degree of freedom
    /// of the end-effector (linear and angular velocities).
    matrix: DMatrix<f64>,
}

impl Jacobian {
    /// Constructs a new Jacobian by differentiating the forward kinematics at the given joints.
    ///
    /// # Arguments
    ///
    /// * `forward` - Forward kinematics of the chain
    /// * `joints` - The joint configuration
    /// * `epsilon` - A small value used for numerical differentiation
    pub fn new<F>(forward: &F, joints: &[f64], epsilon: f64) -> Self
    where
        F: Fn(&[f64]) -> Pose + Sync,
    {
        let matrix = compute_jacobian(forward, joints, epsilon);
        Self { matrix }
    }

    /// Damped least squares step `Jᵀ(JJᵀ + λ²I)⁻¹e` towards the pose error `e`.
    /// Returns None if the damped system cannot be solved.
    pub fn damped_step(&self, error: &Vector6<f64>, lambda: f64) -> Option<DVector<f64>> {
        let jt = self.matrix.transpose();
        let mut system = &self.matrix * &jt;
        for i in 0..6 {
            system[(i, i)] += lambda * lambda;
        }
        let rhs = DVector::from_column_slice(error.as_slice());
        let solved = system.lu().solve(&rhs)?;
        let step = jt * solved;
        if step.iter().all(|v| v.is_finite()) { Some(step) } else { None }
    }
}

/// Function to compute the Jacobian matrix for the given forward kinematics and joint configuration.
/// Columns are computed in parallel, one forward kinematics evaluation per joint.
///
/// The Jacobian matrix maps the joint velocities to the end-effector velocities.
/// Each column corresponds to a joint, and each row corresponds to a degree of freedom
/// of the end-effector (linear and angular velocities).
pub fn compute_jacobian<F>(forward: &F, joints: &[f64], epsilon: f64) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> Pose + Sync,
{
    let mut jacobian = DMatrix::zeros(6, joints.len());
    let current_pose = forward(joints);
    let current_position = current_pose.translation.vector;
    let current_orientation = current_pose.rotation;

    let jacobian_columns: Vec<_> = (0..joints.len()).into_par_iter().map(|i| {
        let mut perturbed_qs = joints.to_vec();
        perturbed_qs[i] += epsilon;
        let perturbed_pose = forward(&perturbed_qs);

        let delta_position = (perturbed_pose.translation.vector - current_position) / epsilon;
        let delta_orientation =
            (perturbed_pose.rotation * current_orientation.inverse()).scaled_axis() / epsilon;

        (delta_position, delta_orientation)
    }).collect();

    for (i, (delta_position, delta_orientation)) in jacobian_columns.into_iter().enumerate() {
        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&delta_position);
        jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&delta_orientation);
    }

    jacobian
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::{Isometry3, Translation3, UnitQuaternion};

    const EPSILON: f64 = 1e-6;

    /// Single rotary joint of the length 1 around Z. The second joint has no effect.
    /// When the first joint rotates, it affects the Y-position and the Z-orientation of the end-effector.
    fn single_rotary_joint(qs: &[f64]) -> Pose {
        let angle = qs[0];
        let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, angle);
        let translation = Translation3::new(angle.cos(), angle.sin(), 0.0);
        Isometry3::from_parts(translation, rotation)
    }

    #[test]
    fn test_compute_jacobian() {
        let jacobian = compute_jacobian(&single_rotary_joint, &[0.0, 0.0], EPSILON);
        assert_eq!(jacobian.nrows(), 6);
        assert_eq!(jacobian.ncols(), 2);

        let mut expected = DMatrix::zeros(6, 2);
        expected[(1, 0)] = 1.0; // Y position is affected by the first joint
        expected[(5, 0)] = 1.0; // Z orientation is affected by the first joint

        for i in 0..6 {
            for j in 0..2 {
                assert!((jacobian[(i, j)] - expected[(i, j)]).abs() < EPSILON,
                        "jacobian[{0},{1}] = {2}, expected {3}", i, j, jacobian[(i, j)], expected[(i, j)]);
            }
        }
    }

    #[test]
    fn test_damped_step_reduces_error() {
        let joints = [0.2, 0.0];
        let target = single_rotary_joint(&[0.3, 0.0]);
        let current = single_rotary_joint(&joints);
        let jacobian = Jacobian::new(&single_rotary_joint, &joints, EPSILON);

        let position = target.translation.vector - current.translation.vector;
        let rotation = (target.rotation * current.rotation.inverse()).scaled_axis();
        let error = Vector6::new(position.x, position.y, position.z, rotation.x, rotation.y, rotation.z);

        let step = jacobian.damped_step(&error, 1e-3).unwrap();
        assert!((joints[0] + step[0] - 0.3).abs() < 1e-3);
        assert!(step[1].abs() < 1e-9);
    }
}
