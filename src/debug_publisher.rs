//! One-way visualization events emitted while waypoints are processed

use std::fmt;
use std::thread;
use std::time::{Duration, SystemTime};
use nalgebra::{Isometry3, Vector3};
use tracing::debug;

/// Debug topics a visualization front end can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugChannel {
    WaypointStart,
    WaypointEnd,
    RobotBase,
    ComputedPose,
}

impl DebugChannel {
    pub fn topic(&self) -> &'static str {
        match self {
            DebugChannel::WaypointStart => "debug_waypoint_1",
            DebugChannel::WaypointEnd => "debug_waypoint_2",
            DebugChannel::RobotBase => "debug_robot_base",
            DebugChannel::ComputedPose => "debug_computedQuat",
        }
    }
}

impl fmt::Display for DebugChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// Timestamped point or pose in a named reference frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugEvent {
    Point { stamp: SystemTime, frame_id: String, point: Vector3<f64> },
    Pose { stamp: SystemTime, frame_id: String, pose: Isometry3<f64> },
}

impl DebugEvent {
    pub fn point(frame_id: &str, point: Vector3<f64>) -> Self {
        DebugEvent::Point { stamp: SystemTime::now(), frame_id: frame_id.to_string(), point }
    }

    pub fn pose(frame_id: &str, pose: Isometry3<f64>) -> Self {
        DebugEvent::Pose { stamp: SystemTime::now(), frame_id: frame_id.to_string(), pose }
    }

    pub fn frame_id(&self) -> &str {
        match self {
            DebugEvent::Point { frame_id, .. } | DebugEvent::Pose { frame_id, .. } => frame_id,
        }
    }
}

/// Repetition of every event, so that a subscriber joining late still sees it.
/// The caller is blocked for `count * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstPolicy {
    pub count: usize,
    pub delay: Duration,
}

impl BurstPolicy {
    pub const POINT: BurstPolicy = BurstPolicy { count: 3, delay: Duration::from_millis(50) };
    pub const POSE: BurstPolicy = BurstPolicy { count: 3, delay: Duration::from_millis(200) };

    /// Single delivery without waiting.
    pub const ONCE: BurstPolicy = BurstPolicy { count: 1, delay: Duration::ZERO };
}

/// Transport seam for debug events.
pub trait DebugPublisher {
    fn publish(&mut self, channel: DebugChannel, event: &DebugEvent);
}

/// Publish the event `policy.count` times, waiting `policy.delay` after each.
pub fn publish_burst<P: DebugPublisher + ?Sized>(publisher: &mut P, channel: DebugChannel,
                                                 event: &DebugEvent, policy: BurstPolicy) {
    for _ in 0..policy.count {
        publisher.publish(channel, event);
        if !policy.delay.is_zero() {
            thread::sleep(policy.delay);
        }
    }
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl DebugPublisher for TracingPublisher {
    fn publish(&mut self, channel: DebugChannel, event: &DebugEvent) {
        match event {
            DebugEvent::Point { frame_id, point, .. } =>
                debug!("[{}] point in {}: ({:.4}, {:.4}, {:.4})", channel, frame_id, point.x, point.y, point.z),
            DebugEvent::Pose { frame_id, pose, .. } => {
                let t = pose.translation.vector;
                let q = pose.rotation;
                debug!("[{}] pose in {}: ({:.4}, {:.4}, {:.4}) quat ({:.4}, {:.4}, {:.4}, {:.4})",
                       channel, frame_id, t.x, t.y, t.z, q.i, q.j, q.k, q.w)
            }
        }
    }
}

/// Drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl DebugPublisher for NullPublisher {
    fn publish(&mut self, _channel: DebugChannel, _event: &DebugEvent) {}
}

/// Keeps all events in memory, in the order of publishing.
#[derive(Debug, Default, Clone)]
pub struct RecordingPublisher {
    pub events: Vec<(DebugChannel, DebugEvent)>,
}

impl RecordingPublisher {
    pub fn on(&self, channel: DebugChannel) -> impl Iterator<Item = &DebugEvent> + '_ {
        self.events.iter().filter(move |(c, _)| *c == channel).map(|(_, e)| e)
    }
}

impl DebugPublisher for RecordingPublisher {
    fn publish(&mut self, channel: DebugChannel, event: &DebugEvent) {
        self.events.push((channel, event.clone()));
    }
}
