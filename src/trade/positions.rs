// Position coverage checks for trade combinations.
//
// Two requirement shapes exist. The legacy shape is a flat set of position
// codes the combination as a whole must cover. The per-slot shape carries
// one requirement group per trade-out slot; a trade-in player can satisfy
// at most one group (a dual-position player cannot cover two slots at once).

use crate::model::{PlayerRecord, Position, PositionRequirement, ALL_POSITIONS};

/// Position requirements for a combination, in one of the two shapes the
/// trade request can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionRequirements {
    /// No positional constraint at all.
    None,
    /// Legacy flat set: the union of the combination's positions must equal
    /// this set.
    Flat(Vec<Position>),
    /// One group per trade-out slot; empty groups are always satisfied.
    PerSlot(Vec<PositionRequirement>),
}

impl PositionRequirements {
    /// Derive per-slot requirements from trade-out requests that have
    /// already been resolved to `PositionRequirement`s.
    pub fn per_slot(reqs: Vec<PositionRequirement>) -> Self {
        if reqs.is_empty() {
            PositionRequirements::None
        } else {
            PositionRequirements::PerSlot(reqs)
        }
    }
}

/// Whether a combination of trade-in players satisfies the position
/// requirements.
pub fn combination_satisfies(combo: &[&PlayerRecord], requirements: &PositionRequirements) -> bool {
    match requirements {
        PositionRequirements::None => true,
        PositionRequirements::Flat(required) => flat_satisfies(combo, required),
        PositionRequirements::PerSlot(groups) => per_slot_satisfies(combo, groups),
    }
}

/// Legacy mode: every player must hold at least one required position, and
/// the positions covered must equal the required set exactly.
fn flat_satisfies(combo: &[&PlayerRecord], required: &[Position]) -> bool {
    if required.is_empty() {
        return true;
    }
    if !combo.iter().all(|p| p.plays_any(required)) {
        return false;
    }

    let mut covered: Vec<Position> = Vec::new();
    for player in combo {
        for pos in player.positions() {
            if required.contains(&pos) && !covered.contains(&pos) {
                covered.push(pos);
            }
        }
    }
    covered.len() == required.len()
}

/// Per-slot mode: every player must be able to play one of the six canonical
/// positions, then each non-empty requirement group must be claimed by a
/// distinct trade-in player. Assignment is greedy first-match in combination
/// order, so it is order dependent: each player fills the first open group
/// it can cover, and no backtracking occurs.
fn per_slot_satisfies(combo: &[&PlayerRecord], groups: &[PositionRequirement]) -> bool {
    if !combo.iter().all(|p| p.plays_any(&ALL_POSITIONS)) {
        return false;
    }

    let mut unsatisfied: Vec<&[Position]> = groups
        .iter()
        .filter(|g| !g.required.is_empty())
        .map(|g| g.required.as_slice())
        .collect();

    if unsatisfied.is_empty() {
        return true;
    }

    for player in combo {
        if let Some(idx) = unsatisfied.iter().position(|req| player.plays_any(req)) {
            unsatisfied.remove(idx);
            if unsatisfied.is_empty() {
                break;
            }
        }
    }

    unsatisfied.is_empty()
}
