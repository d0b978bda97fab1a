use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::debug;

use super::grid::{Cell, OccupancyGrid};
use super::point_expander::PointExpander;
use super::segment::SegmentGraph;
use super::types::{Position2D, SegmentId};
use crate::config::{GoalMode, ResolutionConfig};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no segment within reach of ({x:.2}, {y:.2})")]
    NoSegmentInReach { x: f64, y: f64 },

    #[error("pose ({x:.2}, {y:.2}) lies outside the map")]
    OutsideMap { x: f64, y: f64 },

    #[error("no suitable map cell within {max_distance} m")]
    NoReachableCell { max_distance: f64 },

    #[error("segment {segment} is too narrow and no wider segment is reachable from it")]
    NoWideEnoughSegment { segment: SegmentId },
}

/// Segment a pose was snapped to, and the point it was snapped at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub segment: SegmentId,
    pub point: Position2D,
}

/// Maps world poses onto roadmap segments for robots of a given radius.
pub struct PointResolver<'a> {
    graph: &'a SegmentGraph,
    grid: &'a OccupancyGrid,
    snap_tolerance: f64,
    max_expansion_distance: f64,
    raster: HashMap<Cell, SegmentId>,
    clearance: Option<Vec<f64>>,
    potential: Vec<f64>,
}

impl<'a> PointResolver<'a> {
    pub fn new(graph: &'a SegmentGraph, grid: &'a OccupancyGrid, config: &ResolutionConfig) -> Self {
        Self {
            graph,
            grid,
            snap_tolerance: config.snap_tolerance,
            max_expansion_distance: config.max_expansion_distance,
            raster: rasterize(graph, grid),
            clearance: None,
            potential: Vec::new(),
        }
    }

    /// Wavefront potential of the last voronoi or map resolution, row-major
    /// like the map. Empty until a wavefront has run.
    pub fn potential(&self) -> &[f64] {
        &self.potential
    }

    pub fn into_potential(self) -> Vec<f64> {
        self.potential
    }

    pub fn resolve(&mut self, pose: &Position2D, radius: f64, mode: GoalMode) -> Result<Resolution, ResolveError> {
        let found = match mode {
            GoalMode::UseSegmentGoal => self.nearest_segment(pose, radius)?,
            GoalMode::UseVoronoiGoal => self.voronoi_segment(pose, radius)?,
            GoalMode::UseMapGoal => self.map_segment(pose, radius)?,
        };
        let segment = self.resolve_leaf(found.segment, &found.point, radius)?;
        if segment != found.segment {
            debug!(from = found.segment, to = segment, "leaf segment too narrow, moved to neighbor");
            let snapped = self
                .graph
                .get(segment)
                .map(|s| s.closest_point(pose))
                .unwrap_or(found.point);
            return Ok(Resolution {
                segment,
                point: snapped,
            });
        }
        Ok(found)
    }

    /// Closest segment by perpendicular distance.
    pub fn nearest_segment(&self, pose: &Position2D, radius: f64) -> Result<Resolution, ResolveError> {
        let mut best: Option<(f64, SegmentId)> = None;
        for s in self.graph.iter() {
            if !self.eligible(s.id(), radius) {
                continue;
            }
            let d = s.distance_to(pose);
            if d > 0.5 * s.width() + self.snap_tolerance {
                continue;
            }
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, s.id()));
            }
        }
        let (_, segment) = best.ok_or(ResolveError::NoSegmentInReach { x: pose.x, y: pose.y })?;
        let point = self
            .graph
            .get(segment)
            .map(|s| s.closest_point(pose))
            .unwrap_or(*pose);
        Ok(Resolution { segment, point })
    }

    fn voronoi_segment(&mut self, pose: &Position2D, radius: f64) -> Result<Resolution, ResolveError> {
        self.grid
            .world_to_cell(pose)
            .ok_or(ResolveError::OutsideMap { x: pose.x, y: pose.y })?;
        let mut expander = PointExpander::new(self.grid, self.max_expansion_distance);
        let mut hit = None;
        let found = expander.expand(pose, |cell| match self.raster.get(&cell) {
            Some(&id) if self.eligible(id, radius) => {
                hit = Some(id);
                true
            }
            _ => false,
        });
        self.potential = expander.into_potential();
        match (found, hit) {
            (Some(expansion), Some(segment)) => Ok(Resolution {
                segment,
                point: expansion.position,
            }),
            _ => Err(ResolveError::NoReachableCell {
                max_distance: self.max_expansion_distance,
            }),
        }
    }

    fn map_segment(&mut self, pose: &Position2D, radius: f64) -> Result<Resolution, ResolveError> {
        self.grid
            .world_to_cell(pose)
            .ok_or(ResolveError::OutsideMap { x: pose.x, y: pose.y })?;
        let grid = self.grid;
        let clearance = self.clearance.get_or_insert_with(|| grid.distance_field());
        let mut expander = PointExpander::new(grid, self.max_expansion_distance);
        let found = expander.expand(pose, |cell| {
            grid.is_free(cell)
                && grid
                    .index(cell)
                    .map(|i| clearance[i] >= radius)
                    .unwrap_or(false)
        });
        self.potential = expander.into_potential();
        let found = found.ok_or(ResolveError::NoReachableCell {
            max_distance: self.max_expansion_distance,
        })?;
        self.nearest_segment(&found.position, radius)
    }

    /// Walks away from a leaf that is too narrow for the robot until a
    /// segment it fits on is found, nearest segments first.
    pub fn resolve_leaf(&self, segment: SegmentId, origin: &Position2D, radius: f64) -> Result<SegmentId, ResolveError> {
        let fits = |id: SegmentId| self.graph.get(id).map_or(false, |s| s.fits(radius));
        if fits(segment) {
            return Ok(segment);
        }
        if !self.graph.is_leaf(segment) {
            return Err(ResolveError::NoWideEnoughSegment { segment });
        }
        let mut visited = HashSet::from([segment]);
        let mut queue = VecDeque::from([segment]);
        while let Some(current) = queue.pop_front() {
            let mut next: Vec<SegmentId> = self
                .graph
                .neighbors(current)
                .iter()
                .copied()
                .filter(|n| visited.insert(*n))
                .collect();
            next.sort_by(|a, b| {
                let da = self.graph.get(*a).map_or(f64::INFINITY, |s| s.distance_to(origin));
                let db = self.graph.get(*b).map_or(f64::INFINITY, |s| s.distance_to(origin));
                da.total_cmp(&db)
            });
            if let Some(&wide) = next.iter().find(|&&n| fits(n)) {
                return Ok(wide);
            }
            queue.extend(next);
        }
        Err(ResolveError::NoWideEnoughSegment { segment })
    }

    /// Narrow segments are only worth snapping to when the leaf walk can
    /// still recover a wider one.
    fn eligible(&self, id: SegmentId, radius: f64) -> bool {
        self.graph
            .get(id)
            .map_or(false, |s| s.fits(radius) || self.graph.is_leaf(id))
    }
}

/// Cells crossed by a segment centerline; a cell crossed by several
/// segments belongs to the closest one.
fn rasterize(graph: &SegmentGraph, grid: &OccupancyGrid) -> HashMap<Cell, SegmentId> {
    let step = 0.5 * grid.resolution();
    let mut raster: HashMap<Cell, (f64, SegmentId)> = HashMap::new();
    for s in graph.iter() {
        let points = s.points();
        let samples: Vec<Position2D> = if points.len() == 1 {
            points.to_vec()
        } else {
            points
                .windows(2)
                .flat_map(|w| {
                    let n = (w[0].distance_to(&w[1]) / step).ceil().max(1.0) as usize;
                    (0..=n).map(move |k| {
                        let t = k as f64 / n as f64;
                        Position2D::new(w[0].x + t * (w[1].x - w[0].x), w[0].y + t * (w[1].y - w[0].y))
                    })
                })
                .collect()
        };
        for p in samples {
            if let Some(cell) = grid.world_to_cell(&p) {
                let d = s.distance_to(&grid.cell_to_world(cell));
                let entry = raster.entry(cell).or_insert((d, s.id()));
                if d < entry.0 {
                    *entry = (d, s.id());
                }
            }
        }
    }
    raster.into_iter().map(|(cell, (_, id))| (cell, id)).collect()
}
