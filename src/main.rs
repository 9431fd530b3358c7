use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use rs_robotic_arms::config_from_file::resolve_config_path;
use rs_robotic_arms::debug_publisher::TracingPublisher;
use rs_robotic_arms::factory::{ProtocolVersion, RoboticArmFactory};
use rs_robotic_arms::joint_state::JointState;
use rs_robotic_arms::kinematic_traits::{IkSolver, RoboticArm};
use rs_robotic_arms::subtask::{Subtask, SubtaskConfig};
use rs_robotic_arms::utils::{format_joints, format_pose};

const CONFIG_FILE: &str = "arm_robot_config.yaml";

/// Forward and inverse kinematics with both solver families, and waypoint ingestion.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Robot to create (ur5_robot, ur10e_robot, ... or a robot of the configuration file).
    #[arg(long, default_value = "ur5_robot")]
    robot: String,

    /// Protocol version: noetic or humble.
    #[arg(long, default_value = "humble")]
    protocol: ProtocolVersion,

    /// Configuration file. Searched as ../config/ and then ./config/ if not given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Joint positions in radians, kinematic ordering. Home position if not given.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    joints: Option<Vec<f64>>,

    /// Waypoint record "<id>,x1,y1,z1,x2,y2,z2,r". May be repeated.
    #[arg(long = "waypoint")]
    waypoints: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_configuration(args: &Args) -> Result<(RoboticArmFactory, SubtaskConfig)> {
    let path = args.config.clone().unwrap_or_else(|| resolve_config_path(".", CONFIG_FILE));
    if !path.is_file() {
        if args.config.is_some() {
            anyhow::bail!("Configuration file {} not found", path.display());
        }
        warn!("No configuration at {}, using built-in robots and defaults", path.display());
        return Ok((RoboticArmFactory::new(), SubtaskConfig::default()));
    }
    let factory = RoboticArmFactory::from_yaml_file(&path)
        .with_context(|| format!("Failed to load robots from {}", path.display()))?;
    let subtask = SubtaskConfig::from_yaml_file(&path)
        .with_context(|| format!("Failed to load the subtask section of {}", path.display()))?;
    Ok((factory, subtask))
}

fn demonstrate_kinematics(arm: &dyn RoboticArm, geometric: &[f64]) -> Result<()> {
    let native = arm.reorder_joints(&JointState::at_rest(geometric.to_vec()))?.position;

    let pose = arm.forward_kinematics(geometric, IkSolver::Geometric)?;
    info!("{} forward: {}", IkSolver::Geometric, format_pose(&pose));
    let trac_pose = arm.forward_kinematics(&native, IkSolver::Trac)?;
    info!("{} forward: {}", IkSolver::Trac, format_pose(&trac_pose));

    let solutions = arm.inverse_continuing(&pose, geometric, IkSolver::Geometric)?;
    info!("{} inverse: {} solution(s), closest first", IkSolver::Geometric, solutions.len());
    for solution in &solutions {
        info!("  {}", format_joints(solution));
    }

    let solutions = arm.inverse_kinematics(&pose, IkSolver::Trac);
    match solutions.first() {
        Some(solution) => info!("{} inverse from home: {}", IkSolver::Trac, format_joints(solution)),
        None => warn!("{} inverse from home: no solution", IkSolver::Trac),
    }
    Ok(())
}

fn process_waypoints(arm: &dyn RoboticArm, config: SubtaskConfig, records: &[String]) -> Result<()> {
    let mut subtask = Subtask::new(config, TracingPublisher);
    for record in records {
        let outcome = subtask.ingest(record);
        info!("Waypoint '{}': {:?}", record, outcome);
    }

    let home = arm.config().original_home_joint.clone();
    while let Some(roi) = subtask.dequeue() {
        info!("{}", roi);
        let solutions = arm.inverse_continuing(&roi.start_pose(), &home, IkSolver::Trac)?;
        match solutions.first() {
            Some(solution) => info!("  reachable at {}", format_joints(solution)),
            None => warn!("  start of {} is not reachable", roi.id()),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let (factory, subtask_config) = load_configuration(&args)?;
    let arm = factory.create_robotic_arm(&args.robot, args.protocol)
        .with_context(|| format!("Cannot create {}", args.robot))?;
    for line in arm.config().to_string().lines() {
        info!("{}", line);
    }

    let geometric = match &args.joints {
        Some(joints) => joints.clone(),
        None => {
            let home = JointState::at_rest(arm.config().original_home_joint.clone());
            arm.reorder_joints(&home)?.position
        }
    };
    demonstrate_kinematics(arm.as_ref(), &geometric)?;

    if !args.waypoints.is_empty() {
        process_waypoints(arm.as_ref(), subtask_config, &args.waypoints)?;
    }
    Ok(())
}
