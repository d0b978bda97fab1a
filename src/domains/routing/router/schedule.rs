use std::collections::{BTreeMap, HashMap};

use crate::domains::routing::segment::{Segment, SegmentGraph};
use crate::domains::routing::types::{Checkpoint, Conflict, Precondition, RoutingTable, SegmentId};

/// Stay of a robot on one segment. The robot occupies the segment over the
/// closed interval `[arrival, departure]`; it stands on both segments at a
/// hand-over step. `departure == None` means it parks there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Visit {
    pub segment: SegmentId,
    pub arrival: u32,
    pub departure: Option<u32>,
}

impl Visit {
    pub fn overlaps(&self, other: &Visit) -> bool {
        let a_end = self.departure.unwrap_or(u32::MAX);
        let b_end = other.departure.unwrap_or(u32::MAX);
        self.arrival <= b_end && other.arrival <= a_end
    }
}

/// Time steps needed to drive along a segment.
pub(crate) fn traversal_steps(segment: &Segment, step_length: f64, slowdown: u32) -> u32 {
    let base = (segment.length() / step_length).ceil().max(1.0) as u32;
    base * slowdown.max(1)
}

/// Times a path without any waiting.
pub(crate) fn time_path(graph: &SegmentGraph, path: &[SegmentId], step_length: f64, slowdown: u32) -> Vec<Visit> {
    let mut visits = Vec::with_capacity(path.len());
    let mut t = 0;
    for (i, &id) in path.iter().enumerate() {
        if i + 1 == path.len() {
            visits.push(Visit {
                segment: id,
                arrival: t,
                departure: None,
            });
        } else {
            let steps = graph.get(id).map_or(1, |s| traversal_steps(s, step_length, slowdown));
            visits.push(Visit {
                segment: id,
                arrival: t,
                departure: Some(t + steps),
            });
            t += steps;
        }
    }
    visits
}

fn visits_by_segment(schedule: &[Vec<Visit>]) -> HashMap<SegmentId, Vec<(usize, usize, Visit)>> {
    let mut by_segment: HashMap<SegmentId, Vec<(usize, usize, Visit)>> = HashMap::new();
    for (robot, visits) in schedule.iter().enumerate() {
        for (step, v) in visits.iter().enumerate() {
            by_segment.entry(v.segment).or_default().push((robot, step, *v));
        }
    }
    by_segment
}

/// Replays a schedule and reports every pair of robots sharing a segment
/// they do not fit on together.
pub(crate) fn find_conflicts(graph: &SegmentGraph, schedule: &[Vec<Visit>], radii: &[f64]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (segment_id, visits) in visits_by_segment(schedule) {
        let Some(segment) = graph.get(segment_id) else { continue };
        for (i, (ra, _, va)) in visits.iter().enumerate() {
            for (rb, _, vb) in visits.iter().skip(i + 1) {
                if ra == rb || segment.fits_pair(radii[*ra], radii[*rb]) || !va.overlaps(vb) {
                    continue;
                }
                conflicts.push(Conflict {
                    segment: segment_id,
                    robots: ((*ra).min(*rb), (*ra).max(*rb)),
                    time: va.arrival.max(vb.arrival),
                });
            }
        }
    }
    conflicts.sort_by_key(|c| (c.time, c.segment, c.robots));
    conflicts.dedup();
    conflicts
}

/// Turns a conflict-free schedule into checkpoints. Each checkpoint waits
/// for the last incompatible robot that used the segment before it.
pub(crate) fn build_table(graph: &SegmentGraph, schedule: &[Vec<Visit>], radii: &[f64]) -> RoutingTable {
    let by_segment = visits_by_segment(schedule);
    let routes = schedule
        .iter()
        .enumerate()
        .map(|(robot, visits)| {
            visits
                .iter()
                .enumerate()
                .map(|(step, v)| {
                    let segment = graph.get(v.segment);
                    let mut latest: BTreeMap<usize, (u32, usize)> = BTreeMap::new();
                    if let (Some(segment), Some(others)) = (segment, by_segment.get(&v.segment)) {
                        for (other, other_step, ov) in others {
                            if *other == robot || segment.fits_pair(radii[robot], radii[*other]) {
                                continue;
                            }
                            let Some(left) = ov.departure else { continue };
                            if left >= v.arrival {
                                continue;
                            }
                            let entry = latest.entry(*other).or_insert((left, *other_step));
                            if left > entry.0 {
                                *entry = (left, *other_step);
                            }
                        }
                    }
                    Checkpoint {
                        step,
                        segment: v.segment,
                        position: segment.map(|s| s.midpoint()).unwrap_or_default(),
                        segment_length: segment.map(|s| s.length()).unwrap_or(0.0),
                        arrival: v.arrival,
                        departure: v.departure,
                        preconditions: latest
                            .into_iter()
                            .map(|(other, (_, other_step))| Precondition {
                                robot: other,
                                step: other_step + 1,
                            })
                            .collect(),
                    }
                })
                .collect()
        })
        .collect();
    RoutingTable::new(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::routing::types::Position2D;

    fn line() -> SegmentGraph {
        let p = Position2D::new;
        SegmentGraph::new(vec![
            Segment::new(0, vec![p(0.0, 0.0), p(1.2, 0.0)], 1.0, vec![], vec![1]),
            Segment::new(1, vec![p(1.2, 0.0), p(1.4, 0.0)], 1.0, vec![0], vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn traversal_rounds_up_and_scales() {
        let graph = line();
        let long = graph.get(0).unwrap();
        let short = graph.get(1).unwrap();
        assert_eq!(traversal_steps(long, 0.5, 1), 3);
        assert_eq!(traversal_steps(long, 0.5, 2), 6);
        assert_eq!(traversal_steps(short, 0.5, 1), 1);
    }

    #[test]
    fn hand_over_step_counts_as_occupied() {
        let graph = line();
        let ahead = time_path(&graph, &[0, 1], 0.5, 1);
        assert_eq!(ahead[0].departure, Some(3));
        assert_eq!(ahead[1].arrival, 3);

        // Entering segment 1 at the step the other robot arrives collides.
        let behind = vec![Visit {
            segment: 1,
            arrival: 0,
            departure: Some(3),
        }];
        let conflicts = find_conflicts(&graph, &[ahead.clone(), behind], &[0.6, 0.6]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].time, 3);

        let earlier = vec![Visit {
            segment: 1,
            arrival: 0,
            departure: Some(2),
        }];
        assert!(find_conflicts(&graph, &[ahead, earlier], &[0.6, 0.6]).is_empty());
    }
}
