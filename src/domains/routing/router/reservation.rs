use std::collections::HashMap;

use super::schedule::Visit;
use crate::domains::routing::segment::Segment;
use crate::domains::routing::types::SegmentId;

#[derive(Debug, Clone, Copy)]
struct Reservation {
    robot: usize,
    radius: f64,
    from: u32,
    until: Option<u32>,
}

/// Occupancy of the robots already planned in the current priority order.
#[derive(Debug, Default)]
pub(crate) struct ReservationTable {
    by_segment: HashMap<SegmentId, Vec<Reservation>>,
    latest: u32,
}

impl ReservationTable {
    pub fn reserve(&mut self, robot: usize, radius: f64, visits: &[Visit]) {
        for v in visits {
            self.latest = self.latest.max(v.departure.unwrap_or(v.arrival));
            self.by_segment.entry(v.segment).or_default().push(Reservation {
                robot,
                radius,
                from: v.arrival,
                until: v.departure,
            });
        }
    }

    /// Latest finite time step mentioned by any reservation.
    pub fn latest(&self) -> u32 {
        self.latest
    }

    /// A planned robot that cannot share `segment` with a robot of `radius`
    /// at step `t`.
    pub fn blocker_at(&self, segment: &Segment, radius: f64, t: u32) -> Option<usize> {
        self.incompatible(segment, radius)
            .find(|r| r.from <= t && r.until.map_or(true, |u| t <= u))
            .map(|r| r.robot)
    }

    /// A planned robot that will still need `segment` at or after step `t`.
    pub fn blocker_from(&self, segment: &Segment, radius: f64, t: u32) -> Option<usize> {
        self.incompatible(segment, radius)
            .find(|r| r.until.map_or(true, |u| u >= t))
            .map(|r| r.robot)
    }

    fn incompatible<'s>(&'s self, segment: &'s Segment, radius: f64) -> impl Iterator<Item = &'s Reservation> + 's {
        self.by_segment
            .get(&segment.id())
            .into_iter()
            .flatten()
            .filter(move |r| !segment.fits_pair(radius, r.radius))
    }
}
