//! Waypoint ingestion: parsing, deduplication, plane constrained orientation and the FIFO of
//! regions of interest waiting to be processed.

use std::collections::{HashSet, VecDeque};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use tracing::{error, info};
use crate::debug_publisher::{publish_burst, BurstPolicy, DebugChannel, DebugEvent, DebugPublisher, TracingPublisher};
use crate::roi::Roi;
use crate::waypoint_parser::{WaypointError, WaypointParser};

/// Numbers expected after the identifier: start (3), end (3) and one reserved value.
pub const WAYPOINT_VALUES: usize = 7;

/// Relative size of a cross product below which two vectors count as parallel.
const PARALLEL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct SubtaskConfig {
    /// Position of the robot base, the third point defining the plane.
    pub robot_pos: Vector3<f64>,
    /// Direction that the computed orientation rotates onto the waypoint direction.
    pub ref_vector: Vector3<f64>,
    /// Extra rotation of the waypoint direction inside the plane, radians.
    pub theta: f64,
    /// Reference frame of the debug events.
    pub frame_id: String,
    pub point_burst: BurstPolicy,
    pub pose_burst: BurstPolicy,
}

impl Default for SubtaskConfig {
    fn default() -> Self {
        SubtaskConfig {
            robot_pos: Vector3::zeros(),
            ref_vector: Vector3::x(),
            theta: 0.0,
            frame_id: "base_link".to_string(),
            point_burst: BurstPolicy::POINT,
            pose_burst: BurstPolicy::POSE,
        }
    }
}

/// What happened to an ingested record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New identifier, the region was appended to the queue.
    Stored,
    /// Identifier seen before, nothing changed.
    Duplicate,
    /// The record was rejected.
    Malformed(WaypointError),
}

/// Orientation that rotates `ref_vector` onto the direction start → end of the waypoint
/// (`points[0] - points[1]`), optionally turned by `theta` inside the plane through
/// start, end and robot base (`points[2]`).
///
/// Degenerate input does not fail: collinear points or a zero reference give the identity,
/// a reference parallel to the direction gives the identity, and an antiparallel one gives
/// a half turn about an axis orthogonal to the reference.
pub fn rotate_vector_in_plane(points: [Vector3<f64>; 3], ref_vector: Vector3<f64>, theta: f64) -> UnitQuaternion<f64> {
    let [start, end, base] = points;
    let direction = start - end;
    let to_base = start - base;

    let normal = direction.cross(&to_base);
    if normal.norm() <= PARALLEL_EPSILON * direction.norm() * to_base.norm() || normal.norm() == 0.0 {
        return UnitQuaternion::identity();
    }
    let ref_norm = ref_vector.norm();
    if ref_norm == 0.0 {
        return UnitQuaternion::identity();
    }

    let rotated = UnitQuaternion::from_axis_angle(&Unit::new_normalize(normal), theta) * direction;

    let axis = ref_vector.cross(&rotated);
    let scale = ref_norm * rotated.norm();
    let cos_angle = (ref_vector.dot(&rotated) / scale).clamp(-1.0, 1.0);
    if axis.norm() <= PARALLEL_EPSILON * scale {
        if cos_angle > 0.0 {
            return UnitQuaternion::identity();
        }
        let helper = if ref_vector.x.abs() < 0.9 * ref_norm { Vector3::x() } else { Vector3::y() };
        let orthogonal = Unit::new_normalize(ref_vector.cross(&helper));
        return UnitQuaternion::from_axis_angle(&orthogonal, std::f64::consts::PI);
    }
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), cos_angle.acos())
}

/// Receives waypoint records and keeps the resulting regions in arrival order.
/// An identifier stays a duplicate after its region is dequeued, until [`Subtask::clear`].
pub struct Subtask<P: DebugPublisher = TracingPublisher> {
    config: SubtaskConfig,
    parser: WaypointParser,
    queue: VecDeque<Roi>,
    seen: HashSet<String>,
    publisher: P,
}

impl<P: DebugPublisher> Subtask<P> {
    pub fn new(config: SubtaskConfig, publisher: P) -> Self {
        Self::with_parser(config, WaypointParser::default(), publisher)
    }

    pub fn with_parser(config: SubtaskConfig, parser: WaypointParser, publisher: P) -> Self {
        Subtask { config, parser, queue: VecDeque::new(), seen: HashSet::new(), publisher }
    }

    /// Process one record. Malformed records are logged and skipped, duplicates are ignored.
    pub fn ingest(&mut self, text: &str) -> IngestOutcome {
        let waypoint = match self.parser.unpack_waypoint(text)
            .and_then(|w| w.check_size(WAYPOINT_VALUES).map(|_| w)) {
            Ok(waypoint) => waypoint,
            Err(e) => {
                error!("[Subtask] - Waypoint message '{}' rejected: {}", text, e);
                return IngestOutcome::Malformed(e);
            }
        };

        if self.seen.contains(&waypoint.id) {
            info!("[Subtask] - Waypoint received previously, already registered, key: {}", waypoint.id);
            return IngestOutcome::Duplicate;
        }

        let v = &waypoint.values;
        let pos_start = Vector3::new(v[0], v[1], v[2]);
        let pos_end = Vector3::new(v[3], v[4], v[5]);
        let quat = rotate_vector_in_plane(
            [pos_start, pos_end, self.config.robot_pos], self.config.ref_vector, self.config.theta);
        let roi = Roi::new(&waypoint.id, pos_start, pos_end, quat, v[6]);

        self.publish_debug(&roi);
        self.seen.insert(waypoint.id.clone());
        self.queue.push_back(roi);
        info!("[Subtask] - Waypoint registered, key: {}", waypoint.id);
        IngestOutcome::Stored
    }

    fn publish_debug(&mut self, roi: &Roi) {
        let frame = self.config.frame_id.as_str();
        let points = [
            (DebugChannel::WaypointStart, *roi.pos_start()),
            (DebugChannel::WaypointEnd, *roi.pos_end()),
            (DebugChannel::RobotBase, self.config.robot_pos),
        ];
        for (channel, point) in points {
            publish_burst(&mut self.publisher, channel, &DebugEvent::point(frame, point), self.config.point_burst);
        }
        publish_burst(&mut self.publisher, DebugChannel::ComputedPose,
                      &DebugEvent::pose(frame, roi.start_pose()), self.config.pose_burst);
    }

    /// Remove and return the oldest region. None if the queue is empty.
    pub fn dequeue(&mut self) -> Option<Roi> {
        self.queue.pop_front()
    }

    pub fn peek(&self) -> Option<&Roi> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if a region with this identifier is waiting in the queue.
    pub fn contains(&self, id: &str) -> bool {
        self.queue.iter().any(|roi| roi.id() == id)
    }

    /// True if the identifier has been stored since creation or the last `clear`.
    pub fn was_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Discard all queued regions and forget the identifiers seen so far.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.seen.clear();
    }

    pub fn config(&self) -> &SubtaskConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
