// Portfolio-level aggregation across a batch of lineups.
//
// Answers the questions a multi-entry player asks after a build: how exposed
// am I to each player and team, and how much do my lineups overlap?

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::optimizer::Lineup;
use crate::pool::PlayerPool;

/// Exposure and diversity summary for a set of lineups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub lineup_count: usize,
    /// Player id -> fraction of lineups containing that player.
    pub player_exposure: HashMap<String, f64>,
    /// Team -> fraction of lineups with two or more players from that team.
    pub team_stack_exposure: HashMap<String, f64>,
    /// Mean number of shared players across all lineup pairs. Zero when
    /// fewer than two lineups exist.
    pub average_overlap: f64,
}

impl PortfolioSummary {
    /// Exposure for one player, zero if the player appears nowhere.
    pub fn exposure(&self, player_id: &str) -> f64 {
        self.player_exposure.get(player_id).copied().unwrap_or(0.0)
    }

    /// Player ids whose exposure meets or exceeds `threshold`, highest first.
    pub fn over_exposed(&self, threshold: f64) -> Vec<(&str, f64)> {
        let mut hits: Vec<(&str, f64)> = self
            .player_exposure
            .iter()
            .filter(|(_, &frac)| frac >= threshold)
            .map(|(id, &frac)| (id.as_str(), frac))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hits
    }
}

/// Aggregate exposure and overlap statistics for `lineups`.
///
/// Teams are resolved through the pool; lineup players missing from the pool
/// still count toward player exposure and overlap but not team stacks.
pub fn aggregate(lineups: &[Lineup], pool: &PlayerPool) -> PortfolioSummary {
    let lineup_count = lineups.len();
    if lineup_count == 0 {
        return PortfolioSummary {
            lineup_count: 0,
            player_exposure: HashMap::new(),
            team_stack_exposure: HashMap::new(),
            average_overlap: 0.0,
        };
    }

    let mut player_counts: HashMap<&str, usize> = HashMap::new();
    let mut team_stack_counts: HashMap<&str, usize> = HashMap::new();
    let id_sets: Vec<BTreeSet<&str>> = lineups.iter().map(|l| l.player_id_set()).collect();

    for ids in &id_sets {
        let mut team_counts: HashMap<&str, usize> = HashMap::new();
        for id in ids {
            *player_counts.entry(id).or_insert(0) += 1;
            if let Some(player) = pool.get(id) {
                *team_counts.entry(player.team.as_str()).or_insert(0) += 1;
            }
        }
        for (team, count) in team_counts {
            if count >= 2 {
                *team_stack_counts.entry(team).or_insert(0) += 1;
            }
        }
    }

    let mut overlap_sum = 0usize;
    let mut pair_count = 0usize;
    for i in 0..id_sets.len() {
        for j in (i + 1)..id_sets.len() {
            overlap_sum += id_sets[i].intersection(&id_sets[j]).count();
            pair_count += 1;
        }
    }

    let denom = lineup_count as f64;
    PortfolioSummary {
        lineup_count,
        player_exposure: player_counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count as f64 / denom))
            .collect(),
        team_stack_exposure: team_stack_counts
            .into_iter()
            .map(|(team, count)| (team.to_string(), count as f64 / denom))
            .collect(),
        average_overlap: if pair_count == 0 {
            0.0
        } else {
            overlap_sum as f64 / pair_count as f64
        },
    }
}
