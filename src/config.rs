use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolution: ResolutionConfig,
    pub routing: RoutingConfig,
    pub logging: LoggingConfig,
}

/// How a pose is snapped onto the roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMode {
    /// Nearest segment by geometric distance.
    UseSegmentGoal,
    /// Wavefront over free cells until a segment centerline is hit.
    UseVoronoiGoal,
    /// Wavefront to the nearest free cell with enough clearance, then the
    /// nearest segment to that cell.
    UseMapGoal,
}

/// Where the supplied roadmap comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    Voronoi,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub goal_mode: GoalMode,
    pub graph_mode: GraphMode,
    /// Segments narrower than this are trimmed before resolving poses.
    /// `0.0` disables trimming.
    pub min_segment_diameter: f64,
    /// Extra distance beyond half the segment width a pose may be from it.
    pub snap_tolerance: f64,
    /// Largest wavefront cost in meters before a pose counts as unreachable.
    pub max_expansion_distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub max_priority_attempts: u32,
    pub max_speed_attempts: u32,
    /// Meters travelled per time step at nominal speed.
    pub step_length: f64,
    /// Upper bound of the per-robot slowdown factor.
    pub max_slowdown: u32,
    pub priority_seed: u64,
    pub parallel_path_search: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layers an optional file and `FLEET_ROUTER__SECTION__KEY` environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(config::File::from(p).required(true));
        }
        let config: Config = builder
            .add_source(
                config::Environment::with_prefix("FLEET_ROUTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.routing;
        ensure!(r.max_priority_attempts >= 1, "routing.max_priority_attempts must be at least 1");
        ensure!(r.max_speed_attempts >= 1, "routing.max_speed_attempts must be at least 1");
        ensure!(r.max_slowdown >= 1, "routing.max_slowdown must be at least 1");
        ensure!(
            r.step_length.is_finite() && r.step_length > 0.0,
            "routing.step_length must be positive"
        );
        let s = &self.resolution;
        ensure!(s.min_segment_diameter >= 0.0, "resolution.min_segment_diameter must not be negative");
        ensure!(s.snap_tolerance >= 0.0, "resolution.snap_tolerance must not be negative");
        ensure!(
            s.max_expansion_distance > 0.0,
            "resolution.max_expansion_distance must be positive"
        );
        Ok(())
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            goal_mode: GoalMode::UseVoronoiGoal,
            graph_mode: GraphMode::Voronoi,
            min_segment_diameter: 0.0,
            snap_tolerance: 0.5,
            max_expansion_distance: 10.0,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_priority_attempts: 8,
            max_speed_attempts: 4,
            step_length: 0.5,
            max_slowdown: 4,
            priority_seed: 0,
            parallel_path_search: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
