// Lineup type: a complete slot-to-player assignment with derived totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::pool::PlayerPool;
use crate::roster::RosterTemplate;

/// One filled roster slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledSlot {
    /// Template slot label, e.g. "RB1" or "FLEX".
    pub slot: String,
    pub player_id: String,
}

/// A valid lineup: exactly one player per template slot.
///
/// The per-slot assignment is kept (not just the player set) so the upload
/// CSV can be produced without re-deriving which player fills FLEX.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    /// Slot assignments in template order.
    pub slots: Vec<FilledSlot>,
    pub total_salary: u32,
    pub projected_points: f64,
    /// Mean simulated score. Populated by the simulator.
    #[serde(default)]
    pub sim_ev: Option<f64>,
    /// Boom rate minus bust risk, in [-1, 1]. Populated by the simulator.
    #[serde(default)]
    pub boom_bust_score: Option<f64>,
    /// Fraction of trials below the cash threshold. Populated by the simulator.
    #[serde(default)]
    pub bust_risk: Option<f64>,
    /// Mean simulated score relative to the projection, minus 1.
    #[serde(default)]
    pub expected_roi: Option<f64>,
}

impl Lineup {
    /// Player ids in slot order.
    pub fn player_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.player_id.as_str())
    }

    /// The player set, ignoring slot order. Two lineups are "identical" for
    /// distinctness purposes when these sets are equal.
    pub fn player_id_set(&self) -> BTreeSet<&str> {
        self.player_ids().collect()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.slots.iter().any(|s| s.player_id == player_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Re-check every lineup invariant against the pool and template. Returns a
/// human-readable description of the first violation found.
pub fn verify_lineup(
    lineup: &Lineup,
    pool: &PlayerPool,
    template: &RosterTemplate,
    max_salary: u32,
) -> Result<(), String> {
    if lineup.slots.len() != template.roster_size() {
        return Err(format!(
            "lineup has {} slots, template requires {}",
            lineup.slots.len(),
            template.roster_size()
        ));
    }

    let mut seen = BTreeSet::new();
    let mut salary = 0u32;
    for (filled, slot) in lineup.slots.iter().zip(&template.slots) {
        if filled.slot != slot.label {
            return Err(format!(
                "slot order mismatch: expected {}, found {}",
                slot.label, filled.slot
            ));
        }
        let player = pool
            .get(&filled.player_id)
            .ok_or_else(|| format!("unknown player id '{}'", filled.player_id))?;
        if !slot.accepts(&player.positions) {
            return Err(format!(
                "player '{}' ({:?}) not eligible for slot {}",
                player.name, player.positions, slot.label
            ));
        }
        if !seen.insert(filled.player_id.as_str()) {
            return Err(format!("player id '{}' used twice", filled.player_id));
        }
        salary += player.salary;
    }

    if salary != lineup.total_salary {
        return Err(format!(
            "recorded salary {} does not match actual {}",
            lineup.total_salary, salary
        ));
    }
    if salary > max_salary {
        return Err(format!("salary {salary} exceeds cap {max_salary}"));
    }

    Ok(())
}
