// Lineup correlation model: stack detection and the score multiplier.
//
// The factor is structural (it depends only on which players share teams),
// so it is computed once per lineup, not per trial.

use std::collections::HashMap;

use crate::pool::Player;

const QB_STACK_BONUS: f64 = 0.05;
const GAME_STACK_BONUS: f64 = 0.03;
const DIVERSIFICATION_PENALTY: f64 = 0.02;
const FACTOR_MIN: f64 = 0.8;
const FACTOR_MAX: f64 = 1.2;

/// Positions whose scoring moves with their quarterback's.
fn is_pass_catcher(player: &Player) -> bool {
    player.plays("WR") || player.plays("TE")
}

/// Compute the correlation factor for one lineup.
///
/// Starts at 1.0, adds +0.05 per same-team QB + pass-catcher pairing, +0.03
/// per additional same-team grouping of two or more players, and subtracts
/// 0.02 when the lineup spreads across four or more teams. Clamped to
/// [0.8, 1.2].
pub(crate) fn lineup_correlation_factor(players: &[&Player]) -> f64 {
    let mut team_counts: HashMap<&str, usize> = HashMap::new();
    let mut qb_teams: HashMap<&str, usize> = HashMap::new();
    let mut catcher_teams: HashMap<&str, usize> = HashMap::new();

    for player in players {
        let team = player.team.as_str();
        *team_counts.entry(team).or_insert(0) += 1;
        if player.plays("QB") {
            *qb_teams.entry(team).or_insert(0) += 1;
        }
        if is_pass_catcher(player) {
            *catcher_teams.entry(team).or_insert(0) += 1;
        }
    }

    let mut factor = 1.0;

    // QB stacks: one bonus per QB + pass-catcher pairing on the same team.
    for (team, &qbs) in &qb_teams {
        let catchers = catcher_teams.get(team).copied().unwrap_or(0);
        factor += QB_STACK_BONUS * (qbs * catchers) as f64;
    }

    // Game stacks: each further same-team group of two or more players,
    // beyond the teams already counted as QB stacks.
    for (team, &count) in &team_counts {
        if count < 2 {
            continue;
        }
        let has_qb_stack =
            qb_teams.contains_key(team) && catcher_teams.get(team).copied().unwrap_or(0) > 0;
        if !has_qb_stack {
            factor += GAME_STACK_BONUS;
        }
    }

    // Diversification penalty for scatter-shot rosters.
    if team_counts.len() >= 4 {
        factor -= DIVERSIFICATION_PENALTY;
    }

    factor.clamp(FACTOR_MIN, FACTOR_MAX)
}
