use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use super::reservation::ReservationTable;
use super::schedule::{traversal_steps, Visit};
use crate::domains::routing::segment::SegmentGraph;
use crate::domains::routing::types::SegmentId;

/// (segment, time step, steps already spent on the segment)
type State = (SegmentId, u32, u32);

/// Robots whose reservations stopped the search, with the first place
/// and time each one got in the way.
pub(crate) type Blockers = BTreeMap<usize, (SegmentId, u32)>;

/// Space-time A* for one robot against the reservations of the robots
/// planned before it. A robot may wait on its segment or, once it has
/// driven its length, move to a neighbor it fits on.
pub(crate) struct SpaceTimeSearch<'a> {
    graph: &'a SegmentGraph,
    reservations: &'a ReservationTable,
    radius: f64,
    slowdown: u32,
    hops_to_goal: &'a HashMap<SegmentId, u32>,
    durations: HashMap<SegmentId, u32>,
}

impl<'a> SpaceTimeSearch<'a> {
    pub fn new(
        graph: &'a SegmentGraph,
        reservations: &'a ReservationTable,
        radius: f64,
        slowdown: u32,
        step_length: f64,
        hops_to_goal: &'a HashMap<SegmentId, u32>,
    ) -> Self {
        let durations = hops_to_goal
            .keys()
            .filter_map(|id| graph.get(*id).map(|s| (*id, traversal_steps(s, step_length, slowdown))))
            .collect();
        Self {
            graph,
            reservations,
            radius,
            slowdown,
            hops_to_goal,
            durations,
        }
    }

    pub fn plan(&self, start: SegmentId, goal: SegmentId, horizon: u32) -> Result<Vec<Visit>, Blockers> {
        let mut blockers = Blockers::new();
        if !self.durations.contains_key(&start) || !self.free_at(start, 0, &mut blockers) {
            return Err(blockers);
        }

        let first: State = (start, 0, 0);
        let mut parents: HashMap<State, Option<State>> = HashMap::from([(first, None)]);
        let mut open = BinaryHeap::new();
        open.push(Reverse((self.estimate(first, goal), first.1, first.0, first.2)));

        while let Some(Reverse((_, t, segment, progress))) = open.pop() {
            let state = (segment, t, progress);
            if segment == goal && self.free_from(goal, t, &mut blockers) {
                return Ok(self.visits(&parents, state));
            }
            let steps = self.durations.get(&segment).copied().unwrap_or(1);

            if t < horizon {
                let waited = (segment, t + 1, (progress + 1).min(steps));
                if !parents.contains_key(&waited) && self.free_at(segment, t + 1, &mut blockers) {
                    parents.insert(waited, Some(state));
                    open.push(Reverse((self.estimate(waited, goal), waited.1, waited.0, waited.2)));
                }
            }

            if progress < steps {
                continue;
            }
            for &next in self.graph.neighbors(segment) {
                if !self.hops_to_goal.contains_key(&next) {
                    continue;
                }
                let moved = (next, t, 0);
                if parents.contains_key(&moved) || !self.free_at(next, t, &mut blockers) {
                    continue;
                }
                parents.insert(moved, Some(state));
                open.push(Reverse((self.estimate(moved, goal), moved.1, moved.0, moved.2)));
            }
        }
        Err(blockers)
    }

    /// Lower bound on the steps left until the goal is entered.
    fn estimate(&self, (segment, t, progress): State, goal: SegmentId) -> u32 {
        if segment == goal {
            return t;
        }
        let hops = self.hops_to_goal.get(&segment).copied().unwrap_or(0);
        let steps = self.durations.get(&segment).copied().unwrap_or(1);
        t + steps.saturating_sub(progress) + hops.saturating_sub(1) * self.slowdown
    }

    fn free_at(&self, segment: SegmentId, t: u32, blockers: &mut Blockers) -> bool {
        let Some(s) = self.graph.get(segment) else { return false };
        match self.reservations.blocker_at(s, self.radius, t) {
            Some(robot) => {
                blockers.entry(robot).or_insert((segment, t));
                false
            }
            None => true,
        }
    }

    fn free_from(&self, segment: SegmentId, t: u32, blockers: &mut Blockers) -> bool {
        let Some(s) = self.graph.get(segment) else { return false };
        match self.reservations.blocker_from(s, self.radius, t) {
            Some(robot) => {
                blockers.entry(robot).or_insert((segment, t));
                false
            }
            None => true,
        }
    }

    fn visits(&self, parents: &HashMap<State, Option<State>>, last: State) -> Vec<Visit> {
        let mut states = vec![last];
        let mut current = last;
        while let Some(Some(parent)) = parents.get(&current) {
            states.push(*parent);
            current = *parent;
        }
        states.reverse();

        let mut visits: Vec<Visit> = Vec::new();
        for (segment, t, _) in states {
            match visits.last_mut() {
                Some(v) if v.segment == segment => {}
                Some(v) => {
                    v.departure = Some(t);
                    visits.push(Visit {
                        segment,
                        arrival: t,
                        departure: None,
                    });
                }
                None => visits.push(Visit {
                    segment,
                    arrival: t,
                    departure: None,
                }),
            }
        }
        visits
    }
}
