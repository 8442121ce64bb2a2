// Exact lineup solver: depth-first branch and bound over slot assignments.
//
// Each roster slot is assigned exactly one player and each player fills at
// most one slot, so a multi-eligible player can never satisfy two slots at
// once. The search keeps the winning slot-to-player mapping, which the CSV
// exporter needs.
//
// Bounding: slots are visited most-constrained-first; candidates per slot are
// sorted by descending projection; a branch is cut when the current score
// plus the per-remaining-slot best candidates cannot beat the incumbent, or
// when no completion can satisfy the salary bounds.

use std::collections::BTreeSet;

use crate::pool::Player;
use crate::roster::RosterTemplate;

const SCORE_EPS: f64 = 1e-9;

/// One solve request over an already-filtered candidate pool.
pub(crate) struct SolverInput<'a> {
    pub players: Vec<&'a Player>,
    pub template: &'a RosterTemplate,
    pub min_salary: u32,
    pub max_salary: u32,
    /// Player-id sets of previously accepted lineups; an assignment matching
    /// any of these is rejected so the batch stays distinct.
    pub banned: &'a [BTreeSet<String>],
    /// Search node limit. When exhausted the best incumbent is returned with
    /// `proven_optimal = false`.
    pub node_budget: u64,
}

/// The winning assignment: one player index (into `SolverInput::players`) per
/// template slot, in template order.
#[derive(Debug, Clone)]
pub(crate) struct Solution {
    pub picks: Vec<usize>,
    pub total_salary: u32,
    pub projected_points: f64,
    pub proven_optimal: bool,
}

struct Search<'a> {
    players: &'a [&'a Player],
    /// Slot visit order (indices into template slots), most constrained first.
    order: Vec<usize>,
    /// Candidate player indices per order position, sorted by projection desc.
    candidates: Vec<Vec<usize>>,
    /// Whether order position k shares an eligibility list with position k-1.
    same_as_prev: Vec<bool>,
    best_proj_suffix: Vec<f64>,
    min_sal_suffix: Vec<u32>,
    max_sal_suffix: Vec<u32>,
    min_salary: u32,
    max_salary: u32,
    banned: &'a [BTreeSet<String>],
    used: Vec<bool>,
    picks_by_order: Vec<usize>,
    best: Option<(Vec<usize>, u32, f64)>,
    best_score: f64,
    nodes_left: u64,
    truncated: bool,
}

impl<'a> Search<'a> {
    fn run(&mut self) {
        self.descend(0, 0, 0.0);
    }

    fn descend(&mut self, depth: usize, salary: u32, score: f64) {
        if self.truncated {
            return;
        }
        if self.nodes_left == 0 {
            self.truncated = true;
            return;
        }
        self.nodes_left -= 1;

        if depth == self.order.len() {
            if salary < self.min_salary {
                return;
            }
            if score <= self.best_score + SCORE_EPS && self.best.is_some() {
                return;
            }
            if self.is_banned() {
                return;
            }
            self.best = Some((self.picks_by_order.clone(), salary, score));
            self.best_score = score;
            return;
        }

        // Objective bound: even the best remaining candidates cannot beat the
        // incumbent.
        if self.best.is_some() && score + self.best_proj_suffix[depth] <= self.best_score + SCORE_EPS
        {
            return;
        }
        // Salary bounds: no completion can stay under the cap / reach the floor.
        if salary + self.min_sal_suffix[depth] > self.max_salary {
            return;
        }
        if salary + self.max_sal_suffix[depth] < self.min_salary {
            return;
        }

        // Symmetry break for interchangeable slots (RB1/RB2, WR1..WR3): force
        // strictly increasing candidate indices so each player set is visited
        // once.
        let floor_idx = if self.same_as_prev[depth] {
            self.picks_by_order[depth - 1] + 1
        } else {
            0
        };

        for ci in 0..self.candidates[depth].len() {
            let pi = self.candidates[depth][ci];
            if self.same_as_prev[depth] && pi < floor_idx {
                continue;
            }
            if self.used[pi] {
                continue;
            }
            let player = self.players[pi];
            if salary + player.salary > self.max_salary {
                continue;
            }

            self.used[pi] = true;
            self.picks_by_order[depth] = pi;
            self.descend(depth + 1, salary + player.salary, score + player.projection);
            self.used[pi] = false;

            if self.truncated {
                return;
            }
        }
    }

    fn is_banned(&self) -> bool {
        if self.banned.is_empty() {
            return false;
        }
        let set: BTreeSet<&str> = self
            .picks_by_order
            .iter()
            .map(|&pi| self.players[pi].id.as_str())
            .collect();
        self.banned
            .iter()
            .any(|b| b.len() == set.len() && b.iter().map(String::as_str).eq(set.iter().copied()))
    }
}

/// Solve one lineup. Returns None when no legal, non-banned assignment exists.
pub(crate) fn solve(input: &SolverInput) -> Option<Solution> {
    let slots = &input.template.slots;
    let n_slots = slots.len();
    if input.players.len() < n_slots {
        return None;
    }

    // Candidate lists per slot, in template order.
    let mut by_slot: Vec<Vec<usize>> = Vec::with_capacity(n_slots);
    for slot in slots {
        let mut cands: Vec<usize> = (0..input.players.len())
            .filter(|&i| slot.accepts(&input.players[i].positions))
            .collect();
        if cands.is_empty() {
            return None;
        }
        cands.sort_by(|&a, &b| {
            input.players[b]
                .projection
                .partial_cmp(&input.players[a].projection)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        by_slot.push(cands);
    }

    // Visit order: fewest candidates first, interchangeable slots kept
    // adjacent so the symmetry break applies.
    let mut order: Vec<usize> = (0..n_slots).collect();
    order.sort_by_key(|&i| (by_slot[i].len(), slots[i].eligible.clone(), i));

    let candidates: Vec<Vec<usize>> = order.iter().map(|&i| by_slot[i].clone()).collect();
    let same_as_prev: Vec<bool> = order
        .iter()
        .enumerate()
        .map(|(k, &i)| k > 0 && slots[order[k - 1]].eligible == slots[i].eligible)
        .collect();

    // Suffix bounds over the visit order.
    let mut best_proj_suffix = vec![0.0; n_slots + 1];
    let mut min_sal_suffix = vec![0u32; n_slots + 1];
    let mut max_sal_suffix = vec![0u32; n_slots + 1];
    for k in (0..n_slots).rev() {
        let cands = &candidates[k];
        let best_proj = input.players[cands[0]].projection;
        let min_sal = cands
            .iter()
            .map(|&i| input.players[i].salary)
            .min()
            .unwrap_or(0);
        let max_sal = cands
            .iter()
            .map(|&i| input.players[i].salary)
            .max()
            .unwrap_or(0);
        best_proj_suffix[k] = best_proj_suffix[k + 1] + best_proj;
        min_sal_suffix[k] = min_sal_suffix[k + 1] + min_sal;
        max_sal_suffix[k] = max_sal_suffix[k + 1] + max_sal;
    }

    let mut search = Search {
        players: &input.players,
        candidates,
        same_as_prev,
        best_proj_suffix,
        min_sal_suffix,
        max_sal_suffix,
        min_salary: input.min_salary,
        max_salary: input.max_salary,
        banned: input.banned,
        used: vec![false; input.players.len()],
        picks_by_order: vec![0; n_slots],
        best: None,
        best_score: f64::NEG_INFINITY,
        nodes_left: input.node_budget,
        truncated: false,
        order,
    };
    search.run();

    let truncated = search.truncated;
    let order = std::mem::take(&mut search.order);
    search.best.map(|(picks_by_order, salary, score)| {
        // Map picks back from visit order to template slot order.
        let mut picks = vec![0usize; n_slots];
        for (k, &slot_idx) in order.iter().enumerate() {
            picks[slot_idx] = picks_by_order[k];
        }
        Solution {
            picks,
            total_salary: salary,
            projected_points: score,
            proven_optimal: !truncated,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
