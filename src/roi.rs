//! Region of interest: a resolved waypoint with its target orientation

use std::fmt;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Which end of the region a pose refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiEnd {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    id: String,
    pos_start: Vector3<f64>,
    pos_end: Vector3<f64>,
    quat: UnitQuaternion<f64>,
    /// Seventh value of the record, carried along but not interpreted.
    reserved: f64,
}

impl Roi {
    pub fn new(id: &str, pos_start: Vector3<f64>, pos_end: Vector3<f64>,
               quat: UnitQuaternion<f64>, reserved: f64) -> Self {
        Roi { id: id.to_string(), pos_start, pos_end, quat, reserved }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pos_start(&self) -> &Vector3<f64> {
        &self.pos_start
    }

    pub fn pos_end(&self) -> &Vector3<f64> {
        &self.pos_end
    }

    pub fn quat(&self) -> &UnitQuaternion<f64> {
        &self.quat
    }

    pub fn reserved(&self) -> f64 {
        self.reserved
    }

    pub fn pose(&self, end: RoiEnd) -> Isometry3<f64> {
        let position = match end {
            RoiEnd::Start => self.pos_start,
            RoiEnd::End => self.pos_end,
        };
        Isometry3::from_parts(Translation3::from(position), self.quat)
    }

    pub fn start_pose(&self) -> Isometry3<f64> {
        self.pose(RoiEnd::Start)
    }

    pub fn end_pose(&self) -> Isometry3<f64> {
        self.pose(RoiEnd::End)
    }

    /// Pose as `[x, y, z, qx, qy, qz, qw]`.
    pub fn pose_vector(&self, end: RoiEnd) -> [f64; 7] {
        let pose = self.pose(end);
        let t = pose.translation.vector;
        let q = pose.rotation;
        [t.x, t.y, t.z, q.i, q.j, q.k, q.w]
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}, start: ({:.4}, {:.4}, {:.4}), end: ({:.4}, {:.4}, {:.4}), quat: ({:.4}, {:.4}, {:.4}, {:.4})",
               self.id,
               self.pos_start.x, self.pos_start.y, self.pos_start.z,
               self.pos_end.x, self.pos_end.y, self.pos_end.z,
               self.quat.i, self.quat.j, self.quat.k, self.quat.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_vector() {
        let quat = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 1.0);
        let roi = Roi::new("a", Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0), quat, 0.0);
        let start = roi.pose_vector(RoiEnd::Start);
        let end = roi.pose_vector(RoiEnd::End);
        assert_eq!(&start[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&end[..3], &[4.0, 5.0, 6.0]);
        assert_eq!(start[3..], end[3..]);
        assert!((start[6] - 0.5f64.cos()).abs() < 1e-12);
        assert!((start[5] - 0.5f64.sin()).abs() < 1e-12);
        assert_eq!(roi.end_pose().rotation, quat);
    }
}
