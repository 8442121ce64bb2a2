// Score thresholds keyed by (sport, contest type).
//
// Fixed cutoffs: a lineup "cashes" above the cash line, is "optimal-range"
// above the optimal line, and "booms" above the boom line. Data, not code.

use serde::{Deserialize, Serialize};

use crate::roster::Sport;

/// Contest payout structure, which sets how aggressive the cutoffs are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestType {
    Cash,
    Gpp,
}

/// The three score cutoffs for one (sport, contest type) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreThresholds {
    /// Score that would typically contend for an optimal lineup.
    pub optimal: f64,
    /// Score that typically clears the cash line.
    pub cash: f64,
    /// Exceptional ceiling outcome.
    pub boom: f64,
}

/// Look up the fixed thresholds for a (sport, contest type) pair.
pub fn thresholds_for(sport: Sport, contest: ContestType) -> ScoreThresholds {
    match (sport, contest) {
        (Sport::Nfl, ContestType::Gpp) => ScoreThresholds {
            optimal: 180.0,
            cash: 150.0,
            boom: 220.0,
        },
        (Sport::Nfl, ContestType::Cash) => ScoreThresholds {
            optimal: 170.0,
            cash: 135.0,
            boom: 200.0,
        },
        (Sport::Nba, ContestType::Gpp) => ScoreThresholds {
            optimal: 320.0,
            cash: 270.0,
            boom: 380.0,
        },
        (Sport::Nba, ContestType::Cash) => ScoreThresholds {
            optimal: 300.0,
            cash: 250.0,
            boom: 350.0,
        },
    }
}
