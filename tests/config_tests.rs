use std::io::Write;

use fleet_router::config::{Config, GoalMode, GraphMode};
use tempfile::NamedTempFile;

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.resolution.goal_mode, GoalMode::UseVoronoiGoal);
    assert_eq!(config.resolution.graph_mode, GraphMode::Voronoi);
    assert_eq!(config.routing.max_priority_attempts, 8);
    assert_eq!(config.routing.max_speed_attempts, 4);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[resolution]
goal_mode = "use_map_goal"
graph_mode = "random"

[routing]
max_priority_attempts = 3
priority_seed = 42
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.resolution.goal_mode, GoalMode::UseMapGoal);
    assert_eq!(config.resolution.graph_mode, GraphMode::Random);
    assert_eq!(config.routing.max_priority_attempts, 3);
    assert_eq!(config.routing.priority_seed, 42);
    assert_eq!(config.routing.max_speed_attempts, 4);
    assert!((config.resolution.snap_tolerance - 0.5).abs() < 1e-12);
}

#[test]
fn invalid_values_are_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[routing]\nstep_length = 0.0\n").unwrap();
    assert!(Config::from_file(file.path()).is_err());

    let mut config = Config::default();
    config.routing.max_slowdown = 0;
    assert!(config.validate().is_err());
}

#[test]
fn unknown_goal_mode_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[resolution]\ngoal_mode = \"teleport\"\n").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn load_reads_a_toml_file() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[logging]\nlevel = \"debug\"\n\n[routing]\nmax_slowdown = 2\n").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.routing.max_slowdown, 2);
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::from_file("/nonexistent/fleet-router.toml").is_err());
}
