// Monte Carlo outcome simulator.
//
// Each trial draws a normally-distributed score per player (Box-Muller),
// applies the player's game-context multiplier and the lineup's correlation
// factor, floors at zero, and sums. Per-lineup and per-player threshold
// clearance rates are accumulated across trials.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationSettings;
use crate::optimizer::Lineup;
use crate::pool::{Player, PlayerPool};
use crate::sim::correlation::lineup_correlation_factor;
use crate::sim::thresholds::thresholds_for;

/// Volatility applied when a player record carries none.
pub const DEFAULT_VOLATILITY: f64 = 0.4;

const GAME_FACTOR_MIN: f64 = 0.5;
const GAME_FACTOR_MAX: f64 = 1.5;
const WEATHER_WEIGHT: f64 = 0.25;
const MATCHUP_WEIGHT: f64 = 0.15;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Per-player outcome metrics across all trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMetrics {
    pub average_points: f64,
    pub standard_deviation: f64,
    /// Fraction of attributed trials where the player's lineup cleared the
    /// optimal threshold. For players in several lineups the denominator is
    /// trials times the number of containing lineups, keeping this in [0, 1].
    pub optimal_percentage: f64,
    pub cash_percentage: f64,
    pub boom_percentage: f64,
}

/// Per-lineup outcome metrics across all trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupMetrics {
    /// Arithmetic mean of the lineup's simulated trial scores.
    pub score: f64,
    pub optimal_percentage: f64,
    pub cash_percentage: f64,
    pub boom_percentage: f64,
}

/// Output of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub trials: u32,
    pub player_metrics: HashMap<String, PlayerMetrics>,
    /// Index-aligned with the input lineup list.
    pub lineup_metrics: Vec<LineupMetrics>,
    pub correlation_applied: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid simulation input: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// Draw helpers
// ---------------------------------------------------------------------------

/// Standard-normal sample via the Box-Muller transform.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1.0 - gen() maps [0, 1) to (0, 1] so the log is always finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Deterministic per-player score multiplier from game context, clamped to
/// [0.5, 1.5]. Weather and matchup are penalties in [0, 1]; the stadium
/// factor is a direct multiplier around 1.0.
fn game_context_factor(player: &Player) -> f64 {
    let weather = player.weather_impact.unwrap_or(0.0).clamp(0.0, 1.0);
    let matchup = player.matchup_difficulty.unwrap_or(0.0).clamp(0.0, 1.0);
    let stadium = player.stadium_factor.unwrap_or(1.0);
    (stadium * (1.0 - WEATHER_WEIGHT * weather) * (1.0 - MATCHUP_WEIGHT * matchup))
        .clamp(GAME_FACTOR_MIN, GAME_FACTOR_MAX)
}

fn volatility_of(player: &Player) -> f64 {
    player.volatility.unwrap_or(DEFAULT_VOLATILITY)
}

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PlayerAccum {
    sum: f64,
    sum_sq: f64,
    draws: u64,
    optimal: u64,
    cash: u64,
    boom: u64,
    /// Number of lineups containing this player.
    memberships: u32,
}

#[derive(Default, Clone)]
struct LineupAccum {
    sum: f64,
    optimal: u64,
    cash: u64,
    boom: u64,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run `settings.trials` Monte Carlo trials over the given lineups.
///
/// Pure with respect to its inputs: lineups are read-only here; use
/// [`apply_metrics`] to push the derived analytics back onto them.
pub fn simulate(
    pool: &PlayerPool,
    lineups: &[Lineup],
    settings: &SimulationSettings,
) -> Result<SimulationResult, SimulationError> {
    if settings.trials == 0 {
        return Err(SimulationError::InvalidInput(
            "trials must be at least 1".into(),
        ));
    }

    // Resolve lineups to players up front so a bad id fails fast.
    let mut resolved: Vec<Vec<&Player>> = Vec::with_capacity(lineups.len());
    for (i, lineup) in lineups.iter().enumerate() {
        let mut players = Vec::with_capacity(lineup.len());
        for id in lineup.player_ids() {
            let player = pool.get(id).ok_or_else(|| {
                SimulationError::InvalidInput(format!("lineup {i} references unknown player '{id}'"))
            })?;
            players.push(player);
        }
        resolved.push(players);
    }

    let thresholds = thresholds_for(settings.sport, settings.contest_type);
    let mut rng = match settings.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    debug!(
        "simulating {} trials over {} lineups (correlation: {})",
        settings.trials,
        lineups.len(),
        settings.include_correlation
    );

    // Structural per-lineup correlation factors and per-player context
    // factors are trial-invariant; compute once.
    let corr_factors: Vec<f64> = resolved
        .iter()
        .map(|players| {
            if settings.include_correlation {
                lineup_correlation_factor(players)
            } else {
                1.0
            }
        })
        .collect();
    let context_factors: Vec<Vec<f64>> = resolved
        .iter()
        .map(|players| players.iter().map(|p| game_context_factor(p)).collect())
        .collect();

    let mut player_accums: HashMap<&str, PlayerAccum> = HashMap::new();
    for players in &resolved {
        for player in players {
            player_accums.entry(player.id.as_str()).or_default().memberships += 1;
        }
    }
    let mut lineup_accums = vec![LineupAccum::default(); lineups.len()];

    let mut contributions: Vec<f64> = Vec::new();
    for _trial in 0..settings.trials {
        for (li, players) in resolved.iter().enumerate() {
            let corr = corr_factors[li];
            let mut lineup_score = 0.0;
            contributions.clear();

            for (pi, player) in players.iter().enumerate() {
                let mean = player.projection;
                let std_dev = mean * volatility_of(player);
                let z = standard_normal(&mut rng);
                let raw = mean + z * std_dev;
                let score = (raw * context_factors[li][pi] * corr).max(0.0);
                lineup_score += score;
                contributions.push(score);
            }

            let acc = &mut lineup_accums[li];
            acc.sum += lineup_score;
            let cleared_optimal = lineup_score >= thresholds.optimal;
            let cleared_cash = lineup_score >= thresholds.cash;
            let cleared_boom = lineup_score >= thresholds.boom;
            if cleared_optimal {
                acc.optimal += 1;
            }
            if cleared_cash {
                acc.cash += 1;
            }
            if cleared_boom {
                acc.boom += 1;
            }

            for (pi, player) in players.iter().enumerate() {
                let score = contributions[pi];
                // Preseeded above for every lineup player.
                let pacc = player_accums.entry(player.id.as_str()).or_default();
                pacc.sum += score;
                pacc.sum_sq += score * score;
                pacc.draws += 1;
                if cleared_optimal {
                    pacc.optimal += 1;
                }
                if cleared_cash {
                    pacc.cash += 1;
                }
                if cleared_boom {
                    pacc.boom += 1;
                }
            }
        }
    }

    let trials_f = settings.trials as f64;
    let lineup_metrics = lineup_accums
        .iter()
        .map(|acc| LineupMetrics {
            score: acc.sum / trials_f,
            optimal_percentage: acc.optimal as f64 / trials_f,
            cash_percentage: acc.cash as f64 / trials_f,
            boom_percentage: acc.boom as f64 / trials_f,
        })
        .collect();

    let mut player_metrics: HashMap<String, PlayerMetrics> = HashMap::new();
    for player in pool.iter() {
        let metrics = match player_accums.get(player.id.as_str()) {
            Some(acc) if acc.draws > 0 => {
                let avg = acc.sum / acc.draws as f64;
                let variance = (acc.sum_sq / acc.draws as f64 - avg * avg).max(0.0);
                let attributed = trials_f * acc.memberships as f64;
                PlayerMetrics {
                    average_points: avg,
                    standard_deviation: variance.sqrt(),
                    optimal_percentage: acc.optimal as f64 / attributed,
                    cash_percentage: acc.cash as f64 / attributed,
                    boom_percentage: acc.boom as f64 / attributed,
                }
            }
            // Not in any lineup: projection-derived, no attributed trials.
            _ => PlayerMetrics {
                average_points: player.projection,
                standard_deviation: player.projection * volatility_of(player),
                optimal_percentage: 0.0,
                cash_percentage: 0.0,
                boom_percentage: 0.0,
            },
        };
        player_metrics.insert(player.id.clone(), metrics);
    }

    info!(
        "simulation complete: {} trials, {} lineups",
        settings.trials,
        lineups.len()
    );
    Ok(SimulationResult {
        trials: settings.trials,
        player_metrics,
        lineup_metrics,
        correlation_applied: settings.include_correlation,
    })
}

/// Push simulation-derived analytics back onto the lineup records.
pub fn apply_metrics(result: &SimulationResult, lineups: &mut [Lineup]) {
    for (lineup, metrics) in lineups.iter_mut().zip(&result.lineup_metrics) {
        let bust = 1.0 - metrics.cash_percentage;
        lineup.sim_ev = Some(metrics.score);
        lineup.bust_risk = Some(bust);
        lineup.boom_bust_score = Some(metrics.boom_percentage - bust);
        lineup.expected_roi = if lineup.projected_points > 0.0 {
            Some(metrics.score / lineup.projected_points - 1.0)
        } else {
            None
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
