use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Cell coordinates on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Toroidal grid where each cell may hold any number of agents.
///
/// Keeps both directions of the mapping: the cell of every placed agent and
/// the agents in every cell, in arrival order.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<usize>>,
    positions: Vec<Option<Position>>,
}

impl Grid {
    /// Create an empty `width x height` grid with room for `n_agents` ids.
    pub fn new(width: usize, height: usize, n_agents: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
            positions: vec![None; n_agents],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Moore neighborhood of `pos`, center excluded, wrapped at the edges.
    ///
    /// Offsets that wrap onto the same cell (grids narrower than three cells)
    /// are reported once, and offsets that wrap back onto `pos` are dropped,
    /// so a 1x1 grid has no neighbors.
    pub fn neighborhood(&self, pos: Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(8);
        for dx in -1..=1_isize {
            for dy in -1..=1_isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let neighbor = Position::new(
                    wrap(pos.x, dx, self.width),
                    wrap(pos.y, dy, self.height),
                );
                if neighbor != pos && !neighbors.contains(&neighbor) {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    /// Agents currently in the cell at `pos`.
    pub fn occupants(&self, pos: Position) -> &[usize] {
        &self.cells[self.cell_idx(pos)]
    }

    pub fn is_cell_empty(&self, pos: Position) -> bool {
        self.occupants(pos).is_empty()
    }

    /// Current cell of agent `id`, if it has been placed.
    pub fn position(&self, id: usize) -> Option<Position> {
        self.positions.get(id).copied().flatten()
    }

    /// Put agent `id` in the cell at `pos`.
    ///
    /// An agent already on the grid is moved instead.
    pub fn place_agent(&mut self, id: usize, pos: Position) {
        if id >= self.positions.len() {
            self.positions.resize(id + 1, None);
        }
        if let Some(old) = self.positions[id] {
            let old_idx = self.cell_idx(old);
            self.cells[old_idx].retain(|&agt| agt != id);
        }
        let idx = self.cell_idx(pos);
        self.cells[idx].push(id);
        self.positions[id] = Some(pos);
    }

    /// Relocate agent `id` to `pos`, regardless of who else is there.
    pub fn move_agent(&mut self, id: usize, pos: Position) {
        self.place_agent(id, pos);
    }

    /// Pick a uniformly random empty cell, if any is left.
    pub fn find_empty<R: Rng>(&self, rng: &mut R) -> Option<Position> {
        let empty: Vec<_> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(idx, _)| idx)
            .collect();
        empty.choose(rng).map(|&idx| self.cell_pos(idx))
    }

    /// Pick a uniformly random cell irrespective of occupancy.
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }

    fn cell_idx(&self, pos: Position) -> usize {
        debug_assert!(pos.x < self.width && pos.y < self.height);
        pos.x * self.height + pos.y
    }

    fn cell_pos(&self, idx: usize) -> Position {
        Position::new(idx / self.height, idx % self.height)
    }
}

fn wrap(coord: usize, delta: isize, len: usize) -> usize {
    (coord as isize + delta).rem_euclid(len as isize) as usize
}
