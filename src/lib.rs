//! Agent-based simulation of disease spread with vaccine adoption driven by
//! global prevalence feedback.
//!
//! [`engine::Engine`] owns a population of [`model::Agent`]s on a toroidal
//! [`grid::Grid`], steps them in random order through a
//! [`scheduler::Scheduler`] and records aggregate counts in a
//! [`collector::Collector`] after every step.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod engine;
pub mod grid;
pub mod model;
pub mod scheduler;
pub mod stats;
