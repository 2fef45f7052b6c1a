use crate::model::Agent;
use serde::{Deserialize, Serialize};

pub const TOTAL_INFECTED: &str = "Total_Infected";
pub const TOTAL_RECOVERED: &str = "Total_Recovered";
pub const TOTAL_SUSCEPTIBLE: &str = "Total_Susceptible";
pub const TOTAL_VACCINATED: &str = "Total_Vaccinated";

/// Labels of the collected time series, in record order.
pub const LABELS: [&str; 4] = [
    TOTAL_INFECTED,
    TOTAL_RECOVERED,
    TOTAL_SUSCEPTIBLE,
    TOTAL_VACCINATED,
];

/// Aggregate counts of the population after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Zero-based index of the collection.
    pub step: usize,

    #[serde(rename = "Total_Infected")]
    pub infected: usize,
    #[serde(rename = "Total_Recovered")]
    pub recovered: usize,
    #[serde(rename = "Total_Susceptible")]
    pub susceptible: usize,
    #[serde(rename = "Total_Vaccinated")]
    pub vaccinated: usize,
}

impl Record {
    /// Look up a count by its series label.
    pub fn get(&self, label: &str) -> Option<usize> {
        match label {
            TOTAL_INFECTED => Some(self.infected),
            TOTAL_RECOVERED => Some(self.recovered),
            TOTAL_SUSCEPTIBLE => Some(self.susceptible),
            TOTAL_VACCINATED => Some(self.vaccinated),
            _ => None,
        }
    }
}

/// Append-only history of [`Record`]s.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    history: Vec<Record>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the whole roster and append the result.
    pub fn collect(&mut self, agents: &[Agent]) -> &Record {
        let record = Record {
            step: self.history.len(),
            infected: count_infected(agents),
            recovered: count_recovered(agents),
            susceptible: count_susceptible(agents),
            vaccinated: count_vaccinated(agents),
        };
        self.history.push(record);
        &self.history[record.step]
    }

    pub fn history(&self) -> &[Record] {
        &self.history
    }

    pub fn latest(&self) -> Option<&Record> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Time series for one of the [`LABELS`].
    pub fn series(&self, label: &str) -> Option<Vec<usize>> {
        self.history.iter().map(|rec| rec.get(label)).collect()
    }
}

pub fn count_infected(agents: &[Agent]) -> usize {
    agents.iter().filter(|agt| agt.is_infected()).count()
}

pub fn count_recovered(agents: &[Agent]) -> usize {
    agents.iter().filter(|agt| agt.is_recovered()).count()
}

pub fn count_susceptible(agents: &[Agent]) -> usize {
    agents.iter().filter(|agt| agt.is_susceptible()).count()
}

pub fn count_vaccinated(agents: &[Agent]) -> usize {
    agents.iter().filter(|agt| agt.is_vaccinated()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Health;

    fn roster() -> Vec<Agent> {
        let mut vaccinated = Agent::new(2, Health::Susceptible, 0.95);
        vaccinated.decide_vaccination();
        vec![
            Agent::new(0, Health::Infected { days_left: 4 }, 0.1),
            Agent::new(1, Health::Susceptible, 0.2),
            vaccinated,
        ]
    }

    #[test]
    fn counts_scan_the_roster() {
        let agents = roster();
        assert_eq!(count_infected(&agents), 1);
        assert_eq!(count_recovered(&agents), 0);
        assert_eq!(count_susceptible(&agents), 2);
        assert_eq!(count_vaccinated(&agents), 1);
    }

    #[test]
    fn records_are_indexed_by_collection() {
        let mut agents = roster();
        let mut collector = Collector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.series(TOTAL_INFECTED), Some(vec![]));

        assert_eq!(collector.collect(&agents).step, 0);
        agents[1].infect(3);
        let rec = *collector.collect(&agents);
        assert_eq!(rec.step, 1);
        assert_eq!(rec.infected, 2);

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.series(TOTAL_INFECTED), Some(vec![1, 2]));
        assert_eq!(collector.series(TOTAL_SUSCEPTIBLE), Some(vec![2, 1]));
        assert_eq!(collector.series(TOTAL_VACCINATED), Some(vec![1, 1]));
        assert_eq!(collector.series("Total_Dead"), None);
        assert_eq!(collector.latest(), Some(&rec));
    }

    #[test]
    fn reads_do_not_change_history() {
        let agents = roster();
        let mut collector = Collector::new();
        collector.collect(&agents);
        let first: Vec<_> = LABELS.iter().map(|l| collector.series(l)).collect();
        let second: Vec<_> = LABELS.iter().map(|l| collector.series(l)).collect();
        assert_eq!(first, second);
        assert_eq!(collector.history(), collector.history());
    }
}
