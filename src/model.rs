use crate::config::ModelConfig;
use serde::{Deserialize, Serialize};

/// Propensity above which a susceptible agent gets vaccinated.
pub const VACCINATION_THRESHOLD: f64 = 0.9;

/// Primary health state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Susceptible,
    Infected {
        /// Remaining steps of disease; may start at zero or below.
        days_left: i64,
    },
    /// Declared for completeness; no rule currently reaches it.
    Recovered,
}

/// Agent of the simulation.
///
/// Positions are not stored here: the [`Grid`](crate::grid::Grid) is the
/// single source of truth for where each agent is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: usize,
    health: Health,
    vaccinated: bool,
    vaccine_propensity: f64,
}

impl Agent {
    /// Create a new unvaccinated agent.
    pub fn new(id: usize, health: Health, vaccine_propensity: f64) -> Self {
        Self {
            id,
            health,
            vaccinated: false,
            vaccine_propensity,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn is_susceptible(&self) -> bool {
        self.health == Health::Susceptible
    }

    pub fn is_infected(&self) -> bool {
        matches!(self.health, Health::Infected { .. })
    }

    pub fn is_recovered(&self) -> bool {
        self.health == Health::Recovered
    }

    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    pub fn vaccine_propensity(&self) -> f64 {
        self.vaccine_propensity
    }

    /// Raise the propensity when prevalence exceeds the global threshold.
    pub(crate) fn update_propensity(&mut self, prevalence: f64, cfg: &ModelConfig) {
        if prevalence > cfg.global_pro_factor_threshold {
            self.vaccine_propensity *= cfg.global_pro_factor;
        }
    }

    /// Vaccinate a susceptible agent whose propensity crossed the threshold.
    pub(crate) fn decide_vaccination(&mut self) {
        if self.is_susceptible() && self.vaccine_propensity > VACCINATION_THRESHOLD {
            self.vaccinated = true;
        }
    }

    /// Whether this agent can be targeted by a transmission attempt.
    pub(crate) fn can_be_infected(&self) -> bool {
        !self.is_infected() && !self.is_recovered()
    }

    /// Per-contact transmission probability when this agent is the infector.
    pub(crate) fn transmission_prob(&self, cfg: &ModelConfig) -> f64 {
        let risk = if self.vaccinated { cfg.risk_factor } else { 1.0 };
        cfg.transmissibility * risk
    }

    pub(crate) fn infect(&mut self, days_left: i64) {
        self.health = Health::Infected { days_left };
    }

    /// Advance the disease by one step.
    ///
    /// Returns `true` if the disease ended, in which case the agent is
    /// susceptible again.
    pub(crate) fn progress_disease(&mut self) -> bool {
        let Health::Infected { days_left } = &mut self.health else {
            return false;
        };
        *days_left -= 1;
        if *days_left <= 0 {
            self.health = Health::Susceptible;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, health: Health) {
        self.health = health;
    }

    #[cfg(test)]
    pub(crate) fn set_vaccinated(&mut self, vaccinated: bool) {
        self.vaccinated = vaccinated;
    }

    #[cfg(test)]
    pub(crate) fn set_vaccine_propensity(&mut self, vaccine_propensity: f64) {
        self.vaccine_propensity = vaccine_propensity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propensity_only_grows_above_threshold() {
        let cfg = ModelConfig {
            global_pro_factor: 1.5,
            global_pro_factor_threshold: 0.5,
            ..ModelConfig::default()
        };
        let mut agt = Agent::new(0, Health::Susceptible, 0.4);

        agt.update_propensity(0.5, &cfg);
        assert_eq!(agt.vaccine_propensity(), 0.4);

        agt.update_propensity(0.6, &cfg);
        assert!((agt.vaccine_propensity() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn only_susceptible_agents_get_vaccinated() {
        let mut agt = Agent::new(0, Health::Infected { days_left: 3 }, 0.95);
        agt.decide_vaccination();
        assert!(!agt.is_vaccinated());

        agt.set_health(Health::Susceptible);
        agt.decide_vaccination();
        assert!(agt.is_vaccinated());

        agt.infect(2);
        agt.decide_vaccination();
        assert!(agt.is_vaccinated());
    }

    #[test]
    fn propensity_at_threshold_is_not_enough() {
        let mut agt = Agent::new(0, Health::Susceptible, VACCINATION_THRESHOLD);
        agt.decide_vaccination();
        assert!(!agt.is_vaccinated());
    }

    #[test]
    fn vaccinated_infector_is_less_contagious() {
        let cfg = ModelConfig {
            transmissibility: 0.5,
            risk_factor: 0.4,
            ..ModelConfig::default()
        };
        let mut agt = Agent::new(0, Health::Susceptible, 0.99);
        assert_eq!(agt.transmission_prob(&cfg), 0.5);

        agt.decide_vaccination();
        assert!((agt.transmission_prob(&cfg) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn disease_runs_its_course() {
        let mut agt = Agent::new(0, Health::Infected { days_left: 2 }, 0.0);
        assert!(!agt.progress_disease());
        assert_eq!(agt.health(), Health::Infected { days_left: 1 });
        assert!(agt.progress_disease());
        assert!(agt.is_susceptible());
        assert!(!agt.is_recovered());
        assert!(!agt.progress_disease());
    }

    #[test]
    fn non_positive_duration_ends_on_first_progression() {
        let mut agt = Agent::new(0, Health::Infected { days_left: -1 }, 0.0);
        assert!(agt.progress_disease());
        assert!(agt.is_susceptible());
    }
}
