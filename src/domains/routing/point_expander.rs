use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use tracing::trace;

use super::grid::{Cell, OccupancyGrid};
use super::types::Position2D;

/// Cell accepted by a wavefront expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expansion {
    pub cell: Cell,
    pub position: Position2D,
    /// Wavefront cost in meters from the start cell.
    pub cost: f64,
}

/// Potential-field search over an occupancy grid: costs spread from a start
/// cell through free cells until a predicate accepts one.
pub struct PointExpander<'m> {
    grid: &'m OccupancyGrid,
    max_cost: f64,
    potential: Vec<f64>,
}

impl<'m> PointExpander<'m> {
    pub fn new(grid: &'m OccupancyGrid, max_distance: f64) -> Self {
        Self {
            grid,
            max_cost: max_distance,
            potential: Vec::new(),
        }
    }

    /// Potential of every cell reached by the last expansion, `INFINITY`
    /// for cells the wave never touched.
    pub fn into_potential(self) -> Vec<f64> {
        self.potential
    }

    /// Expands from the cell under `start` and returns the cheapest cell the
    /// predicate accepts. The start cell itself may be occupied; the wave
    /// only spreads through free cells.
    pub fn expand<F>(&mut self, start: &Position2D, mut accept: F) -> Option<Expansion>
    where
        F: FnMut(Cell) -> bool,
    {
        let start_cell = self.grid.world_to_cell(start)?;
        let resolution = self.grid.resolution();
        self.potential = vec![f64::INFINITY; self.grid.width() * self.grid.height()];

        let mut heap = BinaryHeap::new();
        self.potential[self.grid.index(start_cell)?] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), start_cell)));

        while let Some(Reverse((OrderedFloat(cost), cell))) = heap.pop() {
            let idx = self.grid.index(cell)?;
            if cost > self.potential[idx] {
                continue;
            }
            if accept(cell) {
                trace!(?cell, cost, "wavefront accepted cell");
                return Some(Expansion {
                    cell,
                    position: self.grid.cell_to_world(cell),
                    cost,
                });
            }
            for (next, step) in self.grid.neighbors(cell) {
                if !self.grid.is_free(next) {
                    continue;
                }
                let next_cost = cost + step * resolution;
                if next_cost > self.max_cost {
                    continue;
                }
                let next_idx = match self.grid.index(next) {
                    Some(i) => i,
                    None => continue,
                };
                if next_cost < self.potential[next_idx] {
                    self.potential[next_idx] = next_cost;
                    heap.push(Reverse((OrderedFloat(next_cost), next)));
                }
            }
        }
        None
    }
}
