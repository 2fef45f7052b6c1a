use crate::collector::{LABELS, Record};
use crate::stats::TimeSeries;
use anyhow::{Context, Result};
use serde::Serialize;
use toml::{Table, Value};

/// Observable computed from the per-step records of a run.
pub trait Obs {
    fn update(&mut self, rec: &Record);
    fn report(&self) -> Result<Table>;
}

/// Summary statistics of each collected series.
pub struct SeriesStats {
    series_vec: Vec<TimeSeries>,
}

impl SeriesStats {
    pub fn new() -> Self {
        let mut series_vec = Vec::new();
        series_vec.resize_with(LABELS.len(), TimeSeries::new);
        Self { series_vec }
    }
}

impl Obs for SeriesStats {
    fn update(&mut self, rec: &Record) {
        for (label, series) in LABELS.iter().zip(&mut self.series_vec) {
            if let Some(val) = rec.get(label) {
                series.push(val);
            }
        }
    }

    fn report(&self) -> Result<Table> {
        let mut stats = Table::new();
        for (label, series) in LABELS.iter().zip(&self.series_vec) {
            if let Some(report) = series.report() {
                stats.insert(label.to_string(), to_value(&report)?);
            }
        }
        let mut table = Table::new();
        table.insert("series".to_string(), Value::Table(stats));
        Ok(table)
    }
}

/// Highest number of simultaneous infections and when it first happened.
#[derive(Default)]
pub struct PeakInfected {
    peak: Option<(usize, usize)>,
}

#[derive(Serialize)]
struct PeakReport {
    infected: usize,
    step: usize,
}

impl PeakInfected {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Obs for PeakInfected {
    fn update(&mut self, rec: &Record) {
        if self.peak.is_none_or(|(infected, _)| rec.infected > infected) {
            self.peak = Some((rec.infected, rec.step));
        }
    }

    fn report(&self) -> Result<Table> {
        let mut table = Table::new();
        if let Some((infected, step)) = self.peak {
            table.insert("peak".to_string(), to_value(&PeakReport { infected, step })?);
        }
        Ok(table)
    }
}

/// Counts at the end of the run.
#[derive(Default)]
pub struct FinalCounts {
    last: Option<Record>,
}

impl FinalCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Obs for FinalCounts {
    fn update(&mut self, rec: &Record) {
        self.last = Some(*rec);
    }

    fn report(&self) -> Result<Table> {
        let mut table = Table::new();
        if let Some(last) = &self.last {
            table.insert("final".to_string(), to_value(last)?);
        }
        Ok(table)
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new() -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(FinalCounts::new()),
            Box::new(PeakInfected::new()),
            Box::new(SeriesStats::new()),
        ];
        Self { obs_ptr_vec }
    }

    pub fn add_records(&mut self, records: &[Record]) {
        for rec in records {
            for obs in &mut self.obs_ptr_vec {
                obs.update(rec);
            }
        }
    }

    /// Merge the reports of all observables into one table.
    pub fn report(&self) -> Result<Table> {
        let mut table = Table::new();
        for obs in &self.obs_ptr_vec {
            table.extend(obs.report().context("failed to report observable")?);
        }
        Ok(table)
    }
}

fn to_value<T: Serialize>(val: &T) -> Result<Value> {
    Value::try_from(val).context("failed to convert report to TOML")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(step: usize, infected: usize, vaccinated: usize) -> Record {
        Record {
            step,
            infected,
            recovered: 0,
            susceptible: 10 - infected,
            vaccinated,
        }
    }

    #[test]
    fn report_covers_every_observable() {
        let mut analyzer = Analyzer::new();
        analyzer.add_records(&[rec(0, 2, 0), rec(1, 5, 1), rec(2, 5, 3), rec(3, 1, 4)]);
        let report = analyzer.report().expect("failed to report");

        let peak = report["peak"].as_table().expect("peak table");
        assert_eq!(peak["infected"].as_integer(), Some(5));
        assert_eq!(peak["step"].as_integer(), Some(1));

        let last = report["final"].as_table().expect("final table");
        assert_eq!(last["step"].as_integer(), Some(3));
        assert_eq!(last["Total_Vaccinated"].as_integer(), Some(4));

        let series = report["series"].as_table().expect("series table");
        for label in LABELS {
            assert!(series.contains_key(label), "missing {label}");
        }
        let infected = series["Total_Infected"].as_table().expect("infected table");
        assert_eq!(infected["max"].as_integer(), Some(5));
        assert_eq!(infected["min"].as_integer(), Some(1));
        assert_eq!(infected["mean"].as_float(), Some(3.25));
    }

    #[test]
    fn empty_run_reports_nothing_but_empty_series() {
        let analyzer = Analyzer::new();
        let report = analyzer.report().expect("failed to report");
        assert!(!report.contains_key("peak"));
        assert!(!report.contains_key("final"));
        assert_eq!(report["series"].as_table().map(|t| t.len()), Some(0));
    }
}
