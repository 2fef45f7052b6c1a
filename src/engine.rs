use crate::collector::{Collector, count_infected};
use crate::config::{Config, ModelConfig, PrevalenceMode};
use crate::grid::{Grid, Position};
use crate::model::{Agent, Health};
use crate::scheduler::Scheduler;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Exp;
use serde::{Deserialize, Serialize};

/// What an external renderer needs to draw one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: usize,
    pub pos: Position,
    pub infected: bool,
}

/// Simulation engine.
///
/// Holds the agents, the grid they live on, the scheduler, the metrics
/// collector and the random number generator. Every random draw of a run
/// comes from the generator passed to [`Engine::new`], so a seeded generator
/// reproduces a run exactly.
pub struct Engine {
    population: Population,
    scheduler: Scheduler,
    collector: Collector,
    rng: ChaCha12Rng,
}

/// Agents, grid and the rules that act on them.
struct Population {
    cfg: ModelConfig,
    agents: Vec<Agent>,
    grid: Grid,
    duration_dist: Exp<f64>,
}

impl Engine {
    /// Create the initial population and place it on the grid.
    ///
    /// Agents go to a random empty cell while one exists and to a random
    /// cell otherwise.
    pub fn new(cfg: &Config, mut rng: ChaCha12Rng) -> Result<Self> {
        let n_agents = cfg.init.n_agents;
        let duration_dist = Exp::new(1.0 / cfg.model.mean_length_of_disease)
            .context("failed to construct disease duration distribution")?;

        let mut agents = Vec::with_capacity(n_agents);
        let mut grid = Grid::new(cfg.init.width, cfg.init.height, n_agents);
        let mut n_fallback = 0;

        for id in 0..n_agents {
            let vaccine_propensity = rng.random::<f64>();
            let health = if rng.random::<f64>() < cfg.init.initial_infection {
                Health::Infected {
                    days_left: draw_duration(&duration_dist, &mut rng),
                }
            } else {
                Health::Susceptible
            };
            agents.push(Agent::new(id, health, vaccine_propensity));

            let pos = match grid.find_empty(&mut rng) {
                Some(pos) => pos,
                None => {
                    n_fallback += 1;
                    grid.random_cell(&mut rng)
                }
            };
            grid.place_agent(id, pos);
        }

        if n_fallback > 0 {
            log::debug!("placed {n_fallback} agents in occupied cells");
        }
        log::debug!(
            "created {n_agents} agents, {} infected",
            count_infected(&agents)
        );

        let population = Population {
            cfg: cfg.model.clone(),
            agents,
            grid,
            duration_dist,
        };

        Ok(Self {
            population,
            scheduler: Scheduler::new(n_agents),
            collector: Collector::new(),
            rng,
        })
    }

    /// Advance every agent by one step, then record the aggregate counts.
    pub fn step(&mut self) {
        let round_prevalence = self.population.prevalence();
        let population = &mut self.population;
        self.scheduler.step(&mut self.rng, |id, rng| {
            population.step_agent(id, round_prevalence, rng)
        });

        let record = self.collector.collect(&self.population.agents);
        log::debug!("{record:?}");
    }

    /// Perform `n_steps` steps, logging progress.
    pub fn run(&mut self, n_steps: usize) {
        const N_REPORTS: usize = 10;
        let report_every = n_steps.div_ceil(N_REPORTS).max(1);

        for i_step in 0..n_steps {
            self.step();

            if (i_step + 1) % report_every == 0 || i_step + 1 == n_steps {
                let progress = 100.0 * (i_step + 1) as f64 / n_steps as f64;
                log::info!("completed {progress:06.2}%");
            }
        }
    }

    pub fn num_agents(&self) -> usize {
        self.scheduler.n_agents()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.population.agents
    }

    pub fn agent(&self, id: usize) -> Option<&Agent> {
        self.population.agents.get(id)
    }

    pub fn grid(&self) -> &Grid {
        &self.population.grid
    }

    pub fn position(&self, id: usize) -> Option<Position> {
        self.population.grid.position(id)
    }

    /// Current fraction of infected agents.
    pub fn prevalence(&self) -> f64 {
        self.population.prevalence()
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Position and infection flag of every placed agent.
    pub fn snapshot(&self) -> Vec<AgentView> {
        self.population
            .agents
            .iter()
            .filter_map(|agt| {
                let pos = self.position(agt.id())?;
                Some(AgentView {
                    id: agt.id(),
                    pos,
                    infected: agt.is_infected(),
                })
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn agent_mut(&mut self, id: usize) -> &mut Agent {
        &mut self.population.agents[id]
    }
}

impl Population {
    fn prevalence(&self) -> f64 {
        count_infected(&self.agents) as f64 / self.agents.len() as f64
    }

    fn step_agent<R: Rng>(&mut self, id: usize, round_prevalence: f64, rng: &mut R) {
        if rng.random::<f64>() < self.cfg.level_of_movement {
            self.move_agent(id, rng);
        }

        let prevalence = match self.cfg.prevalence {
            PrevalenceMode::RoundStart => round_prevalence,
            PrevalenceMode::Live => self.prevalence(),
        };
        let agt = &mut self.agents[id];
        agt.update_propensity(prevalence, &self.cfg);
        agt.decide_vaccination();

        if agt.is_infected() {
            self.infect_cellmates(id, rng);
            if self.agents[id].progress_disease() {
                log::trace!("agent {id} is no longer infected");
            }
        }
    }

    fn move_agent<R: Rng>(&mut self, id: usize, rng: &mut R) {
        let Some(pos) = self.grid.position(id) else {
            return;
        };
        let neighbors = self.grid.neighborhood(pos);
        if let Some(&new_pos) = neighbors.choose(rng) {
            self.grid.move_agent(id, new_pos);
        }
    }

    fn infect_cellmates<R: Rng>(&mut self, id: usize, rng: &mut R) {
        let Some(pos) = self.grid.position(id) else {
            return;
        };
        let occupants = self.grid.occupants(pos);
        if occupants.len() < 2 {
            return;
        }

        let prob = self.agents[id].transmission_prob(&self.cfg);
        for &mate in occupants {
            if mate == id || !self.agents[mate].can_be_infected() {
                continue;
            }
            if rng.random::<f64>() < prob {
                let days_left = draw_duration(&self.duration_dist, rng);
                self.agents[mate].infect(days_left);
                log::trace!("agent {id} infected agent {mate} for {days_left} steps");
            }
        }
    }
}

/// Draw a disease duration, rounded to the nearest whole step.
fn draw_duration<R: Rng>(dist: &Exp<f64>, rng: &mut R) -> i64 {
    dist.sample(rng).round_ties_even() as i64
}
