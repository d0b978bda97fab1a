use std::collections::VecDeque;

use super::types::Position2D;
use crate::common::{DomainError, DomainResult};

/// Cell values below this are free space.
pub const FREE_THRESHOLD: u8 = 50;
pub const FREE: u8 = 0;
pub const OCCUPIED: u8 = 100;

pub type Cell = (usize, usize);

/// Rasterized occupancy map, row-major, cell `(0, 0)` at `origin`.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    resolution: f64,
    origin: Position2D,
}

impl OccupancyGrid {
    pub fn new(
        width: usize,
        height: usize,
        cells: Vec<u8>,
        resolution: f64,
        origin: Position2D,
    ) -> DomainResult<Self> {
        if cells.len() != width * height {
            return Err(DomainError::InvalidMap {
                reason: format!("{} cells for a {}x{} map", cells.len(), width, height),
            });
        }
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(DomainError::InvalidMap {
                reason: format!("resolution {}", resolution),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
            resolution,
            origin,
        })
    }

    /// A map without obstacles.
    pub fn free(width: usize, height: usize, resolution: f64, origin: Position2D) -> DomainResult<Self> {
        Self::new(width, height, vec![FREE; width * height], resolution, origin)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn set_occupied(&mut self, cell: Cell) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = OCCUPIED;
        }
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        self.index(cell).map(|i| self.cells[i] < FREE_THRESHOLD).unwrap_or(false)
    }

    pub fn world_to_cell(&self, p: &Position2D) -> Option<Cell> {
        let x = ((p.x - self.origin.x) / self.resolution).floor();
        let y = ((p.y - self.origin.y) / self.resolution).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Center of a cell in world coordinates.
    pub fn cell_to_world(&self, cell: Cell) -> Position2D {
        Position2D::new(
            self.origin.x + (cell.0 as f64 + 0.5) * self.resolution,
            self.origin.y + (cell.1 as f64 + 0.5) * self.resolution,
        )
    }

    pub(crate) fn index(&self, cell: Cell) -> Option<usize> {
        if cell.0 < self.width && cell.1 < self.height {
            Some(cell.1 * self.width + cell.0)
        } else {
            None
        }
    }

    /// 8-connected neighbors inside the map with their step cost in cells.
    pub(crate) fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Cell, f64)> + '_ {
        const STEPS: [(i64, i64, f64); 8] = [
            (-1, 0, 1.0),
            (1, 0, 1.0),
            (0, -1, 1.0),
            (0, 1, 1.0),
            (-1, -1, std::f64::consts::SQRT_2),
            (1, -1, std::f64::consts::SQRT_2),
            (-1, 1, std::f64::consts::SQRT_2),
            (1, 1, std::f64::consts::SQRT_2),
        ];
        let (w, h) = (self.width as i64, self.height as i64);
        STEPS.iter().filter_map(move |&(dx, dy, cost)| {
            let nx = cell.0 as i64 + dx;
            let ny = cell.1 as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                None
            } else {
                Some(((nx as usize, ny as usize), cost))
            }
        })
    }

    /// Distance in meters from every cell to the nearest occupied cell
    /// (brushfire). Infinite when the map has no obstacles.
    pub fn distance_field(&self) -> Vec<f64> {
        let mut field = vec![f64::INFINITY; self.cells.len()];
        let mut queue = VecDeque::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                if self.cells[i] >= FREE_THRESHOLD {
                    field[i] = 0.0;
                    queue.push_back((x, y));
                }
            }
        }
        while let Some(cell) = queue.pop_front() {
            let current = field[cell.1 * self.width + cell.0];
            for (n, cost) in self.neighbors(cell) {
                let ni = n.1 * self.width + n.0;
                let candidate = current + cost;
                if candidate < field[ni] {
                    field[ni] = candidate;
                    queue.push_back(n);
                }
            }
        }
        field.iter().map(|d| d * self.resolution).collect()
    }
}
