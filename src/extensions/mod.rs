//! Extensions shipped with the engine.

pub mod baseline;
pub mod statistics;

pub use baseline::{Baseline, BaselineExtension};
pub use statistics::{FindingStatistics, Statistics, StatisticsExtension};
