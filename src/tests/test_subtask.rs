use std::f64::consts::FRAC_PI_4;
use std::time::Duration;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use crate::debug_publisher::{BurstPolicy, DebugChannel, DebugEvent, NullPublisher, RecordingPublisher};
use crate::math_tools::are_quat_equivalent;
use crate::roi::RoiEnd;
use crate::subtask::{IngestOutcome, Subtask, SubtaskConfig};
use crate::waypoint_parser::{WaypointError, WaypointParser};

fn quiet_config() -> SubtaskConfig {
    SubtaskConfig {
        point_burst: BurstPolicy::ONCE,
        pose_burst: BurstPolicy::ONCE,
        ..SubtaskConfig::default()
    }
}

fn reference_config() -> SubtaskConfig {
    SubtaskConfig {
        robot_pos: Vector3::new(0.0, 1.0, 0.0),
        ref_vector: Vector3::new(0.0, 0.0, 1.0),
        ..quiet_config()
    }
}

fn record(id: &str, values: [f64; 7]) -> String {
    WaypointParser::default().pack_waypoint(id, &values).unwrap()
}

#[test]
fn test_fifo_order() {
    let mut subtask = Subtask::new(quiet_config(), NullPublisher);
    for (i, id) in ["A", "B", "C"].iter().enumerate() {
        let x = i as f64;
        let outcome = subtask.ingest(&record(id, [x, 1.0, 1.0, x + 0.5, 0.0, 1.0, 0.0]));
        assert_eq!(outcome, IngestOutcome::Stored);
    }
    assert_eq!(subtask.len(), 3);
    assert_eq!(subtask.peek().map(|roi| roi.id()), Some("A"));
    let ids: Vec<String> = std::iter::from_fn(|| subtask.dequeue())
        .map(|roi| roi.id().to_string())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert!(subtask.dequeue().is_none());
    assert!(subtask.is_empty());
}

#[test]
fn test_duplicates_are_ignored() {
    let mut subtask = Subtask::new(quiet_config(), RecordingPublisher::default());
    let first = record("crack_1", [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.0]);
    let again = record("crack_1", [9.0, 9.0, 9.0, 8.0, 8.0, 8.0, 1.0]);
    assert_eq!(subtask.ingest(&first), IngestOutcome::Stored);
    let events = subtask.publisher().events.len();
    assert_eq!(subtask.ingest(&again), IngestOutcome::Duplicate);
    assert_eq!(subtask.ingest(&first), IngestOutcome::Duplicate);
    assert_eq!(subtask.len(), 1);
    assert_eq!(subtask.publisher().events.len(), events, "Duplicates must not publish");
    assert_eq!(subtask.peek().unwrap().pos_start(), &Vector3::new(0.1, 0.2, 0.3));

    // Still a duplicate after the region left the queue.
    assert!(subtask.dequeue().is_some());
    assert!(!subtask.contains("crack_1"));
    assert!(subtask.was_seen("crack_1"));
    assert_eq!(subtask.ingest(&again), IngestOutcome::Duplicate);

    subtask.clear();
    assert!(!subtask.was_seen("crack_1"));
    assert_eq!(subtask.ingest(&again), IngestOutcome::Stored);
}

#[test]
fn test_malformed_records_are_skipped() {
    let mut subtask = Subtask::new(quiet_config(), RecordingPublisher::default());
    assert_eq!(subtask.ingest("id1,1.0,2.0,3.0"),
               IngestOutcome::Malformed(WaypointError::WrongSize { expected: 7, found: 3 }));
    assert!(matches!(subtask.ingest("42,0,0,0,1,0,0,0"),
                     IngestOutcome::Malformed(WaypointError::InvalidId(_))));
    assert!(matches!(subtask.ingest("wp,0,0,zero,1,0,0,0"),
                     IngestOutcome::Malformed(WaypointError::InvalidNumber(_))));
    assert!(subtask.is_empty());
    assert!(subtask.publisher().events.is_empty());
    assert!(!subtask.was_seen("id1"));

    assert_eq!(subtask.ingest(&record("id2", [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])), IngestOutcome::Stored);
    assert_eq!(subtask.len(), 1);
    assert!(!subtask.contains("id1"));
    assert!(subtask.contains("id2"));
    assert_eq!(subtask.dequeue().map(|roi| roi.id().to_string()), Some("id2".to_string()));
}

#[test]
fn test_non_finite_values_are_rejected() {
    let mut subtask = Subtask::new(quiet_config(), NullPublisher);
    assert_eq!(subtask.ingest("wpN,nan,0,0,1,0,0,0"),
               IngestOutcome::Malformed(WaypointError::InvalidNumber("nan".to_string())));
    assert_eq!(subtask.ingest("wpI,0,0,0,inf,0,0,0"),
               IngestOutcome::Malformed(WaypointError::InvalidNumber("inf".to_string())));
    assert_eq!(subtask.ingest("wpM,0,0,0,1,0,0,-infinity"),
               IngestOutcome::Malformed(WaypointError::InvalidNumber("-infinity".to_string())));
    assert!(subtask.is_empty());
    assert!(!subtask.was_seen("wpN"));
    assert_eq!(subtask.ingest("wpN,0,0,0,1,0,0,0"), IngestOutcome::Stored);
}

#[test]
fn test_end_to_end_orientation() {
    let mut subtask = Subtask::new(reference_config(), NullPublisher);
    assert_eq!(subtask.ingest("wpA,0,0,0,1,0,0,0.5"), IngestOutcome::Stored);
    let roi = subtask.dequeue().unwrap();

    let expected = UnitQuaternion::from_quaternion(
        Quaternion::new(FRAC_PI_4.cos(), 0.0, -FRAC_PI_4.sin(), 0.0));
    assert!(are_quat_equivalent(roi.quat(), &expected, 1e-12));
    assert_eq!(roi.reserved(), 0.5);

    let pose = roi.pose_vector(RoiEnd::Start);
    let expected_pose = [0.0, 0.0, 0.0, 0.0, -FRAC_PI_4.sin(), 0.0, FRAC_PI_4.cos()];
    for (a, b) in pose.iter().zip(expected_pose) {
        assert!((a - b).abs() < 1e-12, "{:?} vs {:?}", pose, expected_pose);
    }
    assert_eq!(roi.end_pose().translation.vector, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_deterministic() {
    let text = "roi_7, 0.3,-0.2,0.8, 0.6,0.1,0.4, 0";
    let mut quats = Vec::new();
    for _ in 0..2 {
        let mut subtask = Subtask::new(SubtaskConfig { theta: 0.3, ..reference_config() }, NullPublisher);
        subtask.ingest(text);
        quats.push(*subtask.dequeue().unwrap().quat());
    }
    assert_eq!(quats[0], quats[1]);
}

#[test]
fn test_debug_events() {
    let burst = BurstPolicy { count: 3, delay: Duration::ZERO };
    let config = SubtaskConfig { point_burst: burst, pose_burst: burst, ..reference_config() };
    let mut subtask = Subtask::new(config, RecordingPublisher::default());
    subtask.ingest("wpA,0,0,0,1,0,0,0");

    let recorder = subtask.publisher();
    let channels: Vec<DebugChannel> = recorder.events.iter().map(|(c, _)| *c).collect();
    let mut expected = Vec::new();
    for channel in [DebugChannel::WaypointStart, DebugChannel::WaypointEnd,
                    DebugChannel::RobotBase, DebugChannel::ComputedPose] {
        expected.extend([channel; 3]);
    }
    assert_eq!(channels, expected);
    assert!(recorder.events.iter().all(|(_, e)| e.frame_id() == "base_link"));

    match recorder.on(DebugChannel::RobotBase).next() {
        Some(DebugEvent::Point { point, .. }) => assert_eq!(*point, Vector3::new(0.0, 1.0, 0.0)),
        other => panic!("Unexpected event {:?}", other),
    }
    match recorder.on(DebugChannel::ComputedPose).next() {
        Some(DebugEvent::Pose { pose, .. }) => {
            assert_eq!(pose.translation.vector, Vector3::zeros());
            assert!((pose.rotation * Vector3::z() - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
        }
        other => panic!("Unexpected event {:?}", other),
    }
}

#[test]
fn test_custom_delimiter() {
    let mut subtask = Subtask::with_parser(quiet_config(), WaypointParser::new(';'), NullPublisher);
    assert_eq!(subtask.ingest("a;1;0;0;0;0;0;0"), IngestOutcome::Stored);
    assert!(matches!(subtask.ingest("b,1,0,0,0,0,0,0"), IngestOutcome::Malformed(_)));
}
