// Lineup optimizer: public contract and the per-lineup batch loop.
//
// One solve per requested lineup. Previously accepted player sets are banned
// from later solves so the batch stays distinct, and players that have hit
// the exposure cap are filtered out of the candidate pool before each solve.

pub mod lineup;
mod solver;

pub use lineup::{FilledSlot, Lineup, verify_lineup};

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::OptimizerSettings;
use crate::pool::{Player, PlayerPool};
use crate::roster::{RosterTemplate, Site};
use solver::{Solution, SolverInput};

/// Search node limit per solve. Hitting it downgrades the batch status from
/// Optimal to Feasible rather than claiming a heuristic result is optimal.
const NODE_BUDGET_PER_SOLVE: u64 = 5_000_000;

// ---------------------------------------------------------------------------
// Public contract types
// ---------------------------------------------------------------------------

/// Outcome classification for one optimization batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// Every requested lineup was produced and proven optimal.
    Optimal,
    /// A usable subset was produced (fewer lineups than requested, or a
    /// solve hit its node budget and returned a best-found lineup).
    Feasible,
    /// No lineup could be constructed under the constraints.
    Infeasible,
    /// An internal fault invalidated the batch; `message` explains it.
    Error,
}

/// Result of one optimization batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerResult {
    pub status: SolveStatus,
    pub lineups: Vec<Lineup>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OptimizerResult {
    /// Whether the lineup list is safe to consume (export, simulate).
    pub fn is_usable(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Invalid-input rejection, raised before any solve begins.
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("invalid optimizer input: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// Batch entry point
// ---------------------------------------------------------------------------

/// Build up to `settings.max_lineups` distinct lineups from the active pool.
///
/// Expected shortfalls (pool too small, constraints too tight) surface as
/// `Infeasible`/`Feasible` statuses; only malformed input is an `Err`.
pub fn build_lineups(
    pool: &PlayerPool,
    settings: &OptimizerSettings,
) -> Result<OptimizerResult, OptimizerError> {
    let template = RosterTemplate::lookup(settings.sport, Site::DraftKings);
    build_lineups_with_template(pool, &template, settings)
}

/// Like [`build_lineups`], but with an explicit template (injected for tests
/// and non-default sites).
pub fn build_lineups_with_template(
    pool: &PlayerPool,
    template: &RosterTemplate,
    settings: &OptimizerSettings,
) -> Result<OptimizerResult, OptimizerError> {
    if settings.max_lineups == 0 {
        return Err(OptimizerError::InvalidInput(
            "max_lineups must be at least 1".into(),
        ));
    }
    if !(0.0..=1.0).contains(&settings.max_exposure) {
        return Err(OptimizerError::InvalidInput(format!(
            "max_exposure must be in [0, 1], got {}",
            settings.max_exposure
        )));
    }
    let max_salary = if settings.max_salary == 0 {
        template.salary_cap
    } else {
        settings.max_salary.min(template.salary_cap)
    };
    if settings.min_salary > max_salary {
        return Err(OptimizerError::InvalidInput(format!(
            "min_salary {} exceeds effective salary cap {}",
            settings.min_salary, max_salary
        )));
    }

    // An empty active pool is an expected condition, not malformed input:
    // report it as Infeasible so batch callers see a status, not an Err.
    let active: Vec<&Player> = pool.active().collect();
    if active.is_empty() {
        return Ok(OptimizerResult {
            status: SolveStatus::Infeasible,
            lineups: Vec::new(),
            message: Some("player pool has no active players".into()),
        });
    }
    debug!(
        "optimizing: {} active players, {} slots, cap {}",
        active.len(),
        template.roster_size(),
        max_salary
    );

    let mut lineups: Vec<Lineup> = Vec::with_capacity(settings.max_lineups);
    let mut banned: Vec<BTreeSet<String>> = Vec::new();
    let mut appearances: HashMap<&str, usize> = HashMap::new();
    let mut all_proven = true;
    let mut internal_fault: Option<String> = None;

    for iteration in 0..settings.max_lineups {
        // Exposure cap: once a player has appeared in max_exposure of the
        // requested lineups, drop them from later candidate pools.
        let candidates: Vec<&Player> = active
            .iter()
            .copied()
            .filter(|p| {
                let count = appearances.get(p.id.as_str()).copied().unwrap_or(0);
                count == 0
                    || (count as f64) / (settings.max_lineups as f64) < settings.max_exposure
            })
            .collect();

        let solution = solver::solve(&SolverInput {
            players: candidates.clone(),
            template,
            min_salary: settings.min_salary,
            max_salary,
            banned: &banned,
            node_budget: NODE_BUDGET_PER_SOLVE,
        });

        let Some(solution) = solution else {
            // Bans and exposure filters only grow, so later iterations
            // cannot succeed either.
            debug!("solve {iteration} infeasible, stopping batch");
            break;
        };

        let lineup = to_lineup(&solution, &candidates, template);
        if let Err(violation) = verify_lineup(&lineup, pool, template, max_salary) {
            warn!("solver produced an invalid lineup: {violation}");
            internal_fault = Some(violation);
            continue;
        }
        if !solution.proven_optimal {
            all_proven = false;
        }

        for id in lineup.player_ids() {
            // Borrow from the pool so the key outlives this loop body.
            if let Some(p) = pool.get(id) {
                *appearances.entry(p.id.as_str()).or_insert(0) += 1;
            }
        }
        banned.push(lineup.player_ids().map(str::to_string).collect());
        lineups.push(lineup);
    }

    let produced = lineups.len();
    let status = if produced == 0 {
        match internal_fault {
            Some(_) => SolveStatus::Error,
            None => SolveStatus::Infeasible,
        }
    } else if produced == settings.max_lineups && all_proven && internal_fault.is_none() {
        SolveStatus::Optimal
    } else {
        SolveStatus::Feasible
    };

    let message = match status {
        SolveStatus::Infeasible => Some(format!(
            "could not construct any lineup from {} active players under cap {}",
            active.len(),
            max_salary
        )),
        SolveStatus::Error => internal_fault,
        SolveStatus::Feasible if produced < settings.max_lineups => Some(format!(
            "produced {produced} of {} requested lineups",
            settings.max_lineups
        )),
        _ => None,
    };

    info!(
        "optimizer finished: {produced}/{} lineups, status {:?}",
        settings.max_lineups, status
    );
    Ok(OptimizerResult {
        status,
        lineups,
        message,
    })
}

fn to_lineup(solution: &Solution, candidates: &[&Player], template: &RosterTemplate) -> Lineup {
    let slots = solution
        .picks
        .iter()
        .zip(&template.slots)
        .map(|(&pi, slot)| FilledSlot {
            slot: slot.label.clone(),
            player_id: candidates[pi].id.clone(),
        })
        .collect();
    Lineup {
        slots,
        total_salary: solution.total_salary,
        projected_points: solution.projected_points,
        sim_ev: None,
        boom_bust_score: None,
        bust_risk: None,
        expected_roi: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
