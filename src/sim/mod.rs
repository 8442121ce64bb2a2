// Monte Carlo simulation of lineup outcomes.

pub mod correlation;
pub mod monte_carlo;
pub mod thresholds;

pub use monte_carlo::{
    apply_metrics, simulate, LineupMetrics, PlayerMetrics, SimulationError, SimulationResult,
};
pub use thresholds::{thresholds_for, ContestType, ScoreThresholds};
