// Combination search: produce ranked trade-in combinations within budget
// and position constraints.
//
// Candidates are pre-sorted by the active strategy (skipped when the list
// already carries a bye-weighted order), then scanned greedily. Players are
// consumed as combinations are accepted: a player used in one accepted
// combination never reappears in another within the same call.

use std::collections::HashSet;

use crate::model::{PlayerRecord, Strategy, TradeCombination};
use crate::trade::brackets::priority_of;
use crate::trade::positions::{combination_satisfies, PositionRequirements};

/// Default cap on returned combinations.
pub const DEFAULT_MAX_OPTIONS: usize = 10;

/// Parameters for one generation pass.
#[derive(Debug)]
pub struct ComboRequest<'a> {
    /// Salary freed by the trade-outs plus any cash in bank.
    pub budget: i64,
    pub strategy: Strategy,
    pub requirements: &'a PositionRequirements,
    /// Number of players being traded out (and therefore in).
    pub slots_needed: usize,
    pub max_options: usize,
    /// The candidate list is already bye-weighted; keep its order.
    pub target_bye_round: bool,
}

/// The at-most-one-use invariant, made explicit: names of players already
/// consumed by an accepted combination.
#[derive(Debug, Default)]
pub struct UsedSet {
    names: HashSet<String>,
}

impl UsedSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn mark(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Generate ranked trade combinations. An empty candidate pool (or one with
/// nothing affordable) yields an empty list, never an error.
pub fn generate(candidates: &[PlayerRecord], request: &ComboRequest) -> Vec<TradeCombination> {
    if request.slots_needed == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let players = presort(candidates, request);
    let mut used = UsedSet::default();

    let mut combos = if request.slots_needed == 1 {
        singles(&players, request, &mut used)
    } else {
        pairs(&players, request, &mut used)
    };

    // Re-rank by the aggregate metric. Hybrid results keep generation order:
    // the candidate list was already in priority order.
    match request.strategy {
        Strategy::MaximizeValue => {
            combos.sort_by(|a, b| b.total_diff.total_cmp(&a.total_diff));
        }
        Strategy::MaximizeBase => {
            combos.sort_by(|a, b| b.total_projection.total_cmp(&a.total_projection));
        }
        Strategy::Hybrid => {}
    }

    combos.truncate(request.max_options);
    combos
}

/// Order candidates by strategy. Bye-weighted lists pass through untouched,
/// including hybrid's priority filtering: the weighted order is
/// authoritative there.
fn presort(candidates: &[PlayerRecord], request: &ComboRequest) -> Vec<PlayerRecord> {
    let mut players: Vec<PlayerRecord> = candidates.to_vec();
    if request.target_bye_round {
        return players;
    }

    match request.strategy {
        Strategy::MaximizeValue => {
            players.sort_by(|a, b| b.diff.total_cmp(&a.diff));
        }
        Strategy::MaximizeBase => {
            players.sort_by(|a, b| b.projection.total_cmp(&a.projection));
        }
        Strategy::Hybrid => {
            // Players with no priority key are outside the tiered tables and
            // drop out of hybrid ranking entirely.
            let mut keyed: Vec<(crate::trade::brackets::PriorityKey, PlayerRecord)> = players
                .into_iter()
                .filter_map(|p| priority_of(&p).map(|k| (k, p)))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
            players = keyed.into_iter().map(|(_, p)| p).collect();
        }
    }
    players
}

/// Single-slot search: first affordable, position-valid players in sorted
/// order.
fn singles(
    players: &[PlayerRecord],
    request: &ComboRequest,
    used: &mut UsedSet,
) -> Vec<TradeCombination> {
    let mut combos = Vec::new();
    for player in players {
        if used.contains(&player.name) {
            continue;
        }
        if player.price <= request.budget && combination_satisfies(&[player], request.requirements)
        {
            combos.push(TradeCombination::assemble(&[player], request.budget));
            used.mark(&player.name);
            if combos.len() >= request.max_options {
                break;
            }
        }
    }
    combos
}

/// Multi-slot search: greedy nested pair scan. For each unused first player
/// in order, pick a partner according to the strategy, accept the pair, and
/// consume both.
fn pairs(
    players: &[PlayerRecord],
    request: &ComboRequest,
    used: &mut UsedSet,
) -> Vec<TradeCombination> {
    let mut combos = Vec::new();

    for i in 0..players.len() {
        if combos.len() >= request.max_options {
            break;
        }
        let first = &players[i];
        if used.contains(&first.name) {
            continue;
        }
        // Hybrid iterates in priority order and skips first players that
        // alone exceed the budget.
        if request.strategy == Strategy::Hybrid && first.price > request.budget {
            continue;
        }

        let partner = match request.strategy {
            Strategy::MaximizeValue => best_diff_partner(players, i, request, used),
            // Base and hybrid both take the first valid partner in list
            // order; under bye targeting the list order already encodes
            // coverage preference.
            Strategy::MaximizeBase | Strategy::Hybrid => {
                first_valid_partner(players, i, request, used)
            }
        };

        if let Some(j) = partner {
            let second = &players[j];
            combos.push(TradeCombination::assemble(&[first, second], request.budget));
            used.mark(&first.name);
            used.mark(&second.name);
        }
    }

    combos
}

/// Partner maximizing combined value score among affordable, position-valid
/// pairs.
fn best_diff_partner(
    players: &[PlayerRecord],
    i: usize,
    request: &ComboRequest,
    used: &UsedSet,
) -> Option<usize> {
    let first = &players[i];
    let mut best: Option<(usize, f64)> = None;

    for (j, second) in players.iter().enumerate() {
        if j == i || used.contains(&second.name) {
            continue;
        }
        if !combination_satisfies(&[first, second], request.requirements) {
            continue;
        }
        if first.price + second.price > request.budget {
            continue;
        }
        let total_diff = first.diff + second.diff;
        if best.is_none_or(|(_, d)| total_diff > d) {
            best = Some((j, total_diff));
        }
    }

    best.map(|(j, _)| j)
}

/// First affordable, position-valid partner in list order.
fn first_valid_partner(
    players: &[PlayerRecord],
    i: usize,
    request: &ComboRequest,
    used: &UsedSet,
) -> Option<usize> {
    let first = &players[i];
    for (j, second) in players.iter().enumerate() {
        if j == i || used.contains(&second.name) {
            continue;
        }
        if !combination_satisfies(&[first, second], request.requirements) {
            continue;
        }
        if first.price + second.price <= request.budget {
            return Some(j);
        }
    }
    None
}
