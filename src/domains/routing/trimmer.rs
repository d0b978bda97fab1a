use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::segment::{Segment, SegmentGraph};
use super::types::{Position2D, SegmentId};

/// Returns a copy of `graph` without the segments narrower than
/// `min_diameter`. A kept segment that touched removed ones is linked to
/// every kept segment reachable through them, so kept segments stay
/// connected wherever they were connected before.
pub fn trim_graph(graph: &SegmentGraph, min_diameter: f64) -> SegmentGraph {
    let kept: HashSet<SegmentId> = graph
        .iter()
        .filter(|s| s.width() >= min_diameter)
        .map(|s| s.id())
        .collect();

    let mut sides: HashMap<SegmentId, (Vec<SegmentId>, Vec<SegmentId>)> = HashMap::new();
    for s in graph.iter().filter(|s| kept.contains(&s.id())) {
        let preds = relink(graph, &kept, s.id(), s.predecessors());
        let succs = relink(graph, &kept, s.id(), s.successors());
        sides.insert(s.id(), (preds, succs));
    }

    // Make every link visible from both ends.
    let ids: Vec<SegmentId> = graph.iter().map(|s| s.id()).filter(|id| kept.contains(id)).collect();
    for &id in &ids {
        let (preds, succs) = sides[&id].clone();
        let Some(segment) = graph.get(id) else { continue };
        for (other, anchor) in preds
            .iter()
            .map(|o| (*o, segment.start()))
            .chain(succs.iter().map(|o| (*o, segment.end())))
        {
            let Some(other_segment) = graph.get(other) else { continue };
            let (o_preds, o_succs) = sides.entry(other).or_default();
            if o_preds.contains(&id) || o_succs.contains(&id) {
                continue;
            }
            if closer_to_start(other_segment, &anchor) {
                o_preds.push(id);
            } else {
                o_succs.push(id);
            }
        }
    }

    let removed = graph.len() - kept.len();
    debug!(removed, kept = kept.len(), min_diameter, "trimmed roadmap");

    let segments: Vec<Segment> = graph
        .iter()
        .filter(|s| kept.contains(&s.id()))
        .map(|s| {
            let (preds, succs) = sides.remove(&s.id()).unwrap_or_default();
            s.with_links(preds, succs)
        })
        .collect();
    SegmentGraph::from_trusted(segments)
}

/// Replaces removed neighbors by the kept segments behind them.
fn relink(graph: &SegmentGraph, kept: &HashSet<SegmentId>, origin: SegmentId, side: &[SegmentId]) -> Vec<SegmentId> {
    let mut out = Vec::new();
    for &n in side {
        if kept.contains(&n) {
            if n != origin && !out.contains(&n) {
                out.push(n);
            }
            continue;
        }
        let mut visited = HashSet::from([origin, n]);
        let mut queue = VecDeque::from([n]);
        while let Some(current) = queue.pop_front() {
            for &next in graph.neighbors(current) {
                if !visited.insert(next) {
                    continue;
                }
                if kept.contains(&next) {
                    if !out.contains(&next) {
                        out.push(next);
                    }
                } else {
                    queue.push_back(next);
                }
            }
        }
    }
    out
}

fn closer_to_start(segment: &Segment, p: &Position2D) -> bool {
    segment.start().distance_to(p) <= segment.end().distance_to(p)
}
