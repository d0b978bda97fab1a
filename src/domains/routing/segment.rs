use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Position2D, SegmentId};
use crate::common::{DomainError, DomainResult};

/// One roadmap element: a polyline through free space with a clear width.
///
/// Predecessors touch the first point, successors touch the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    id: SegmentId,
    points: Vec<Position2D>,
    width: f64,
    predecessors: Vec<SegmentId>,
    successors: Vec<SegmentId>,
}

impl Segment {
    pub fn new(
        id: SegmentId,
        points: Vec<Position2D>,
        width: f64,
        predecessors: Vec<SegmentId>,
        successors: Vec<SegmentId>,
    ) -> Self {
        Self {
            id,
            points,
            width,
            predecessors,
            successors,
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn points(&self) -> &[Position2D] {
        &self.points
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn predecessors(&self) -> &[SegmentId] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[SegmentId] {
        &self.successors
    }

    pub fn start(&self) -> Position2D {
        self.points.first().copied().unwrap_or_default()
    }

    pub fn end(&self) -> Position2D {
        self.points.last().copied().unwrap_or_default()
    }

    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    /// Point halfway along the polyline.
    pub fn midpoint(&self) -> Position2D {
        let mut remaining = 0.5 * self.length();
        for w in self.points.windows(2) {
            let piece = w[0].distance_to(&w[1]);
            if piece >= remaining && piece > 0.0 {
                let t = remaining / piece;
                return Position2D::new(
                    w[0].x + t * (w[1].x - w[0].x),
                    w[0].y + t * (w[1].y - w[0].y),
                );
            }
            remaining -= piece;
        }
        self.start()
    }

    /// Distinct neighbor ids, predecessors first.
    pub fn neighbors(&self) -> Vec<SegmentId> {
        let mut out: Vec<SegmentId> = Vec::with_capacity(self.predecessors.len() + self.successors.len());
        for &n in self.predecessors.iter().chain(self.successors.iter()) {
            if n != self.id && !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }

    /// A robot of this radius can drive along the segment. The width is the
    /// clear radius the segment offers.
    pub fn fits(&self, radius: f64) -> bool {
        radius <= self.width
    }

    /// Two robots can be on the segment at the same time: their combined
    /// radius stays within the width.
    pub fn fits_pair(&self, radius_a: f64, radius_b: f64) -> bool {
        radius_a + radius_b <= self.width
    }

    pub fn closest_point(&self, p: &Position2D) -> Position2D {
        if self.points.len() < 2 {
            return self.start();
        }
        let mut best = self.start();
        let mut best_dist = f64::INFINITY;
        for w in self.points.windows(2) {
            let candidate = closest_on_piece(&w[0], &w[1], p);
            let d = candidate.distance_to(p);
            if d < best_dist {
                best_dist = d;
                best = candidate;
            }
        }
        best
    }

    /// Perpendicular distance to the polyline, clipped at its endpoints.
    pub fn distance_to(&self, p: &Position2D) -> f64 {
        self.closest_point(p).distance_to(p)
    }

    pub(crate) fn with_links(&self, predecessors: Vec<SegmentId>, successors: Vec<SegmentId>) -> Self {
        Self {
            id: self.id,
            points: self.points.clone(),
            width: self.width,
            predecessors,
            successors,
        }
    }
}

fn closest_on_piece(a: &Position2D, b: &Position2D, p: &Position2D) -> Position2D {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return *a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Position2D::new(a.x + t * dx, a.y + t * dy)
}

/// Immutable roadmap. Segments are looked up by id through an index so the
/// graph may contain cycles without any segment owning another.
#[derive(Debug, Clone, Default)]
pub struct SegmentGraph {
    segments: Vec<Segment>,
    index: HashMap<SegmentId, usize>,
    adjacency: HashMap<SegmentId, Vec<SegmentId>>,
}

impl SegmentGraph {
    pub fn new(segments: Vec<Segment>) -> DomainResult<Self> {
        let mut index = HashMap::with_capacity(segments.len());
        for (i, s) in segments.iter().enumerate() {
            if index.insert(s.id, i).is_some() {
                return Err(DomainError::InvalidGraph {
                    reason: format!("duplicate segment id {}", s.id),
                });
            }
            if s.points.is_empty() {
                return Err(DomainError::InvalidGraph {
                    reason: format!("segment {} has no points", s.id),
                });
            }
            if !s.width.is_finite() || s.width <= 0.0 {
                return Err(DomainError::InvalidGraph {
                    reason: format!("segment {} has width {}", s.id, s.width),
                });
            }
        }
        for s in &segments {
            if let Some(missing) = s
                .predecessors
                .iter()
                .chain(s.successors.iter())
                .find(|n| !index.contains_key(n))
            {
                return Err(DomainError::InvalidGraph {
                    reason: format!("segment {} links to unknown segment {}", s.id, missing),
                });
            }
        }
        Ok(Self::from_trusted(segments))
    }

    /// Builds a graph whose links are already known to be consistent.
    pub(crate) fn from_trusted(segments: Vec<Segment>) -> Self {
        let index = segments.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let mut adjacency: HashMap<SegmentId, Vec<SegmentId>> =
            segments.iter().map(|s| (s.id, s.neighbors())).collect();
        for s in &segments {
            for n in s.neighbors() {
                let back = adjacency.entry(n).or_default();
                if !back.contains(&s.id) {
                    back.push(s.id);
                }
            }
        }
        Self {
            segments,
            index,
            adjacency,
        }
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.index.get(&id).map(|&i| &self.segments[i])
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Neighbors of `id` as seen from both sides: links are treated as
    /// undirected even when only one of the two segments lists the other.
    pub fn neighbors(&self, id: SegmentId) -> &[SegmentId] {
        self.adjacency.get(&id).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// A segment with at most one neighbor in the undirected graph.
    pub fn is_leaf(&self, id: SegmentId) -> bool {
        self.neighbors(id).len() <= 1
    }

    /// Smallest and largest width in the graph.
    pub fn width_range(&self) -> Option<(f64, f64)> {
        self.segments.iter().map(|s| s.width).fold(None, |acc, w| match acc {
            None => Some((w, w)),
            Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
        })
    }
}
