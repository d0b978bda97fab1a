#![allow(dead_code)]

use fleet_router::{Checkpoint, OccupancyGrid, Position2D, RoutingTable, Segment, SegmentGraph, SegmentId};

pub fn seg(id: SegmentId, a: (f64, f64), b: (f64, f64), width: f64, preds: &[SegmentId], succs: &[SegmentId]) -> Segment {
    Segment::new(
        id,
        vec![Position2D::new(a.0, a.1), Position2D::new(b.0, b.1)],
        width,
        preds.to_vec(),
        succs.to_vec(),
    )
}

/// Three 1 m corridor segments 0-1-2 along the x axis with a 1 m bay (3)
/// at the junction of 0 and 1.
pub fn corridor_with_bay() -> SegmentGraph {
    SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (1.0, 0.0), 1.0, &[], &[1, 3]),
        seg(1, (1.0, 0.0), (2.0, 0.0), 1.0, &[0, 3], &[2]),
        seg(2, (2.0, 0.0), (3.0, 0.0), 1.0, &[1], &[]),
        seg(3, (1.0, 0.0), (1.0, 1.0), 1.0, &[0, 1], &[]),
    ])
    .unwrap()
}

/// Three 1 m segments in a row without a bay. Robots pass each other only
/// when their combined radius fits the width.
pub fn corridor() -> SegmentGraph {
    SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (1.0, 0.0), 1.0, &[], &[1]),
        seg(1, (1.0, 0.0), (2.0, 0.0), 1.0, &[0], &[2]),
        seg(2, (2.0, 0.0), (3.0, 0.0), 1.0, &[1], &[]),
    ])
    .unwrap()
}

/// Main line 0-1-2 crossed at segment 1 by a path 3-1-4.
pub fn crossing() -> SegmentGraph {
    SegmentGraph::new(vec![
        seg(0, (-1.0, 0.0), (0.0, 0.0), 1.0, &[], &[1, 3]),
        seg(1, (0.0, 0.0), (1.0, 0.0), 1.0, &[0, 3], &[2, 4]),
        seg(2, (1.0, 0.0), (2.0, 0.0), 1.0, &[1, 4], &[]),
        seg(3, (0.0, -1.0), (0.0, 0.0), 1.0, &[], &[0, 1]),
        seg(4, (1.0, 0.0), (1.0, 1.0), 1.0, &[1, 2], &[]),
    ])
    .unwrap()
}

/// Obstacle free 0.1 m map covering x in [-0.5, 3.5], y in [-0.5, 1.5].
pub fn corridor_map() -> OccupancyGrid {
    OccupancyGrid::free(40, 20, 0.1, Position2D::new(-0.5, -0.5)).unwrap()
}

/// Checks that no two robots that do not fit together share a segment at
/// any time step.
pub fn assert_replay_safe(graph: &SegmentGraph, table: &RoutingTable, radii: &[f64]) {
    let routes: Vec<&[Checkpoint]> = table.iter().map(|(_, r)| r).collect();
    for (a, route_a) in routes.iter().enumerate() {
        for (b, route_b) in routes.iter().enumerate().skip(a + 1) {
            for ca in route_a.iter() {
                for cb in route_b.iter().filter(|c| c.segment == ca.segment) {
                    let segment = graph.get(ca.segment).unwrap();
                    if segment.fits_pair(radii[a], radii[b]) {
                        continue;
                    }
                    let a_end = ca.departure.unwrap_or(u32::MAX);
                    let b_end = cb.departure.unwrap_or(u32::MAX);
                    assert!(
                        a_end < cb.arrival || b_end < ca.arrival,
                        "robots {a} and {b} overlap on segment {}",
                        ca.segment
                    );
                }
            }
        }
    }
}

/// Consecutive checkpoints are neighbors in the roadmap.
pub fn assert_continuous(graph: &SegmentGraph, route: &[Checkpoint]) {
    for w in route.windows(2) {
        assert!(
            graph.neighbors(w[0].segment).contains(&w[1].segment),
            "{} and {} are not adjacent",
            w[0].segment,
            w[1].segment
        );
    }
}
