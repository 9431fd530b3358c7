use std::f64::consts::PI;
use std::thread;
use crate::arm_error::ArmError;
use crate::factory::{ProtocolVersion, RoboticArmFactory};
use crate::joint_state::JointState;
use crate::kinematic_traits::{IkSolver, RoboticArm};
use crate::tests::test_utils::{are_isometries_close, found_joints_approx_equal, random_joints};

fn create(name: &str) -> Box<dyn RoboticArm> {
    RoboticArmFactory::new()
        .create_robotic_arm(name, ProtocolVersion::Ros1Noetic)
        .expect("Built-in robot must be available")
}

fn to_native(arm: &dyn RoboticArm, geometric: &[f64]) -> Vec<f64> {
    arm.reorder_joints(&JointState::at_rest(geometric.to_vec())).unwrap().position
}

#[test]
fn test_cross_family_forward_agreement() {
    let factory = RoboticArmFactory::new();
    for name in factory.robotic_arm_types() {
        let arm = factory.create_robotic_arm(&name, ProtocolVersion::Ros2Humble).unwrap();
        for joints in random_joints(1, 100, 2.0 * PI) {
            let geometric = arm.forward_kinematics(&joints, IkSolver::Geometric).unwrap();
            let trac = arm.forward_kinematics(&to_native(arm.as_ref(), &joints), IkSolver::Trac).unwrap();
            assert!(are_isometries_close(&geometric, &trac),
                    "{}: families disagree for {:?}", name, joints);
        }
    }
}

#[test]
fn test_geometric_round_trip() {
    for name in ["ur5_robot", "ur3e_robot", "ur10e_robot"] {
        let arm = create(name);
        for joints in random_joints(2, 100, PI) {
            let pose = arm.forward_kinematics(&joints, IkSolver::Geometric).unwrap();
            let solutions = arm.inverse_continuing(&pose, &joints, IkSolver::Geometric).unwrap();
            assert!(!solutions.is_empty(), "{}: no solutions for {:?}", name, joints);
            for solution in &solutions {
                let check = arm.forward_kinematics(solution, IkSolver::Geometric).unwrap();
                assert!(are_isometries_close(&check, &pose), "{}: invalid solution {:?}", name, solution);
            }
            assert!(found_joints_approx_equal(&solutions[..1], &joints),
                    "{}: closest solution {:?} is not {:?}", name, solutions[0], joints);
        }
    }
}

#[test]
fn test_trac_round_trip() {
    let arm = create("ur5e_robot");
    for geometric in random_joints(3, 10, PI) {
        let native = to_native(arm.as_ref(), &geometric);
        let pose = arm.forward_kinematics(&native, IkSolver::Trac).unwrap();
        let seed: Vec<f64> = native.iter().map(|q| q + 0.02).collect();
        let solutions = arm.inverse_continuing(&pose, &seed, IkSolver::Trac).unwrap();
        assert_eq!(solutions.len(), 1, "No numerical solution for {:?}", native);
        let check = arm.forward_kinematics(&solutions[0], IkSolver::Trac).unwrap();
        assert!(are_isometries_close(&check, &pose));
        assert!(found_joints_approx_equal(&solutions, &native), "{:?} vs {:?}", solutions[0], native);
    }
}

#[test]
fn test_trac_from_home() {
    let arm = create("ur5_robot");
    let home = arm.config().original_home_joint.clone();
    let target: Vec<f64> = home.iter().enumerate().map(|(i, q)| q + 0.1 * (i as f64 - 2.5)).collect();
    let pose = arm.forward_kinematics(&target, IkSolver::Trac).unwrap();
    let solutions = arm.inverse_kinematics(&pose, IkSolver::Trac);
    assert_eq!(solutions.len(), 1);
    let check = arm.forward_kinematics(&solutions[0], IkSolver::Trac).unwrap();
    assert!(are_isometries_close(&check, &pose));
}

#[test]
fn test_solutions_cross_families() {
    // Geometric solutions reordered are valid inputs of the numerical family.
    let arm = create("ur10e_robot");
    let joints = vec![0.7, -1.1, 1.4, -0.6, 1.2, -0.3];
    let pose = arm.forward_kinematics(&joints, IkSolver::Geometric).unwrap();
    for solution in arm.inverse_kinematics(&pose, IkSolver::Geometric) {
        let native = to_native(arm.as_ref(), &solution);
        let check = arm.forward_kinematics(&native, IkSolver::Trac).unwrap();
        assert!(are_isometries_close(&check, &pose));
    }
}

#[test]
fn test_reorder_is_involution() {
    let arm = create("ur3e_robot");
    let values = random_joints(4, 30, 10.0);
    for triple in values.chunks(3) {
        let state = JointState::new(triple[0].clone(), triple[1].clone(), triple[2].clone());
        let once = arm.reorder_joints(&state).unwrap();
        assert_eq!(once.position[0], state.position[2]);
        assert_eq!(once.velocity[2], state.velocity[0]);
        assert_eq!(once.torque[1], state.torque[1]);
        assert_eq!(arm.reorder_joints(&once).unwrap(), state);
    }
}

#[test]
fn test_wrong_length_fails_fast() {
    let arm = create("ur5_robot");
    for solver in IkSolver::ALL {
        assert!(matches!(arm.forward_kinematics(&[0.0; 5], solver),
                         Err(ArmError::InvalidLength { expected: 6, found: 5 })));
    }
    let state = JointState::new(vec![0.0; 6], vec![0.0; 6], vec![0.0; 5]);
    assert!(arm.reorder_joints(&state).is_err());
}

#[test]
fn test_concurrent_read_only_calls() {
    let arm = create("ur5_robot");
    let arm = arm.as_ref();
    let inputs = random_joints(5, 8, PI);
    thread::scope(|scope| {
        for joints in &inputs {
            scope.spawn(move || {
                let pose = arm.forward_kinematics(joints, IkSolver::Geometric).unwrap();
                let solutions = arm.inverse_continuing(&pose, joints, IkSolver::Geometric).unwrap();
                assert!(found_joints_approx_equal(&solutions, joints));
            });
        }
    });
}

#[test]
fn test_factory_errors() {
    let factory = RoboticArmFactory::new();
    let error = factory.create_robotic_arm("abb_irb2400", ProtocolVersion::Ros2Humble).err()
        .expect("Unknown robot must fail");
    let message = error.to_string();
    assert!(message.starts_with("Invalid robotic arm type: abb_irb2400."), "{}", message);
    assert!(message.contains("ur5_robot"));
    for name in factory.robotic_arm_types() {
        for protocol in ProtocolVersion::ALL {
            let arm = factory.create_robotic_arm(&name, protocol).unwrap();
            assert_eq!(arm.protocol_version(), protocol);
            assert_eq!(arm.name(), name);
        }
    }
}
