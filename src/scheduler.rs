use rand::prelude::*;

/// Activates every agent once per step in a fresh random order.
#[derive(Debug, Clone)]
pub struct Scheduler {
    order: Vec<usize>,
}

impl Scheduler {
    /// Create a scheduler for agents `0..n_agents`.
    pub fn new(n_agents: usize) -> Self {
        Self {
            order: (0..n_agents).collect(),
        }
    }

    pub fn n_agents(&self) -> usize {
        self.order.len()
    }

    /// Shuffle the roster and call `act` on each agent id in the new order.
    pub fn step<R, F>(&mut self, rng: &mut R, mut act: F)
    where
        R: Rng,
        F: FnMut(usize, &mut R),
    {
        self.order.shuffle(rng);
        for &id in &self.order {
            act(id, rng);
        }
    }
}
