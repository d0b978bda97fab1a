use std::collections::HashMap;

use petgraph::algo::{astar, dijkstra};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::RobotRequest;
use crate::domains::routing::segment::SegmentGraph;
use crate::domains::routing::types::SegmentId;

/// Shortest roadmap path of one robot, ignoring every other robot.
#[derive(Debug, Clone)]
pub(crate) struct IndependentPath {
    pub segments: Vec<SegmentId>,
    pub length: f64,
    /// Fewest segment changes from each segment to the goal, over the
    /// segments the robot fits on.
    pub hops_to_goal: HashMap<SegmentId, u32>,
}

/// The roadmap restricted to segments a robot of a given radius fits on.
/// Edge cost is the roadmap distance between the two segment midpoints.
struct FitGraph {
    graph: UnGraph<SegmentId, f64>,
    nodes: HashMap<SegmentId, NodeIndex>,
}

impl FitGraph {
    fn build(roadmap: &SegmentGraph, radius: f64) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut nodes = HashMap::new();
        for s in roadmap.iter().filter(|s| s.fits(radius)) {
            nodes.insert(s.id(), graph.add_node(s.id()));
        }
        for s in roadmap.iter() {
            let Some(&a) = nodes.get(&s.id()) else { continue };
            for &n in roadmap.neighbors(s.id()) {
                if n <= s.id() {
                    continue;
                }
                let (Some(&b), Some(other)) = (nodes.get(&n), roadmap.get(n)) else { continue };
                graph.add_edge(a, b, 0.5 * (s.length() + other.length()));
            }
        }
        Self { graph, nodes }
    }
}

pub(crate) fn shortest_path(roadmap: &SegmentGraph, request: &RobotRequest) -> Option<IndependentPath> {
    let fit = FitGraph::build(roadmap, request.radius);
    let start = *fit.nodes.get(&request.start)?;
    let goal = *fit.nodes.get(&request.goal)?;

    let (length, nodes) = astar(&fit.graph, start, |n| n == goal, |e| *e.weight(), |_| 0.0)?;
    let segments = nodes.into_iter().map(|n| fit.graph[n]).collect();

    let hops_to_goal = dijkstra(&fit.graph, goal, None, |_| 1u32)
        .into_iter()
        .map(|(n, hops)| (fit.graph[n], hops))
        .collect();

    Some(IndependentPath {
        segments,
        length,
        hops_to_goal,
    })
}

/// One shortest-path search per robot. The searches only read the roadmap,
/// so they can run on scoped worker threads.
pub(crate) fn independent_paths(
    roadmap: &SegmentGraph,
    requests: &[RobotRequest],
    parallel: bool,
) -> Vec<Option<IndependentPath>> {
    if !parallel || requests.len() < 2 {
        return requests.iter().map(|r| shortest_path(roadmap, r)).collect();
    }
    std::thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|r| scope.spawn(move || shortest_path(roadmap, r)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}
