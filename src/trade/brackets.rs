// Tiered hybrid scoring tables: price brackets and level requirements.
//
// Nine fixed price bands map a price onto a bracket ordinal. Each (level,
// bracket) pair maps onto a closed value-score window taken from a shared
// ladder of intervals: the window shifts one step down the ladder per
// bracket and per level, so higher levels progressively drop eligibility
// for the most expensive brackets.

use std::cmp::Ordering;

use crate::model::PlayerRecord;

// ---------------------------------------------------------------------------
// Price brackets
// ---------------------------------------------------------------------------

/// The nine contiguous price bands, bracket 1 first.
const BRACKETS: [(i64, i64); 9] = [
    (250_000, 317_500),
    (317_501, 385_000),
    (385_001, 452_500),
    (452_501, 520_000),
    (520_001, 587_500),
    (587_501, 655_000),
    (655_001, 722_500),
    (722_501, 790_000),
    (790_001, 857_500),
];

/// Map a price onto its bracket ordinal (1-9). Prices outside all bands have
/// no bracket and are excluded from tiered scoring.
pub fn bracket_of(price: i64) -> Option<u8> {
    BRACKETS
        .iter()
        .position(|&(lo, hi)| (lo..=hi).contains(&price))
        .map(|i| (i + 1) as u8)
}

// ---------------------------------------------------------------------------
// Level requirements
// ---------------------------------------------------------------------------

/// Value score below which a player is ineligible at every level.
pub const MIN_HYBRID_DIFF: f64 = 7.80;

/// The shared ladder of value-score windows. Rung 0 is open-ended above;
/// rung 9 bottoms out at the global floor. The window for (level, bracket)
/// is the rung at index (level-1) + (bracket-1); indices past the end of
/// the ladder mean "not eligible at this level".
const VALUE_WINDOWS: [(f64, f64); 10] = [
    (32.50, f64::INFINITY),
    (29.58, 32.49),
    (26.67, 29.57),
    (23.75, 26.66),
    (20.83, 23.74),
    (17.92, 20.82),
    (15.00, 17.91),
    (12.08, 14.99),
    (9.17, 12.07),
    (MIN_HYBRID_DIFF, 9.16),
];

/// Whether a (value score, price) pair qualifies at the given level (1-10).
pub fn meets_level(diff: f64, price: i64, level: u8) -> bool {
    if !(1..=10).contains(&level) {
        return false;
    }
    let Some(bracket) = bracket_of(price) else {
        return false;
    };
    let rung = (level as usize - 1) + (bracket as usize - 1);
    match VALUE_WINDOWS.get(rung) {
        Some(&(lo, hi)) => diff >= lo && diff <= hi,
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Priority keys
// ---------------------------------------------------------------------------

/// Hybrid-strategy sort key: lower level sorts first, then lower bracket,
/// then better (higher) bye grade, then higher value score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityKey {
    pub level: u8,
    pub bracket: u8,
    pub bye_grade: u8,
    pub diff: f64,
}

impl Eq for PriorityKey {}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then(self.bracket.cmp(&other.bracket))
            .then(other.bye_grade.cmp(&self.bye_grade))
            .then(other.diff.total_cmp(&self.diff))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Unknown bye grades rank behind grade 4 in hybrid priority.
const UNKNOWN_BYE_GRADE: u8 = 5;

/// Compute a player's hybrid priority: the first (most exclusive) level at
/// which they qualify, scanning 1 through 10. None means the player is
/// excluded from hybrid ranking entirely.
pub fn priority_of(record: &PlayerRecord) -> Option<PriorityKey> {
    if record.diff < MIN_HYBRID_DIFF {
        return None;
    }
    for level in 1..=10u8 {
        if meets_level(record.diff, record.price, level) {
            let bracket = bracket_of(record.price)?;
            return Some(PriorityKey {
                level,
                bracket,
                bye_grade: record.bye_grade.unwrap_or(UNKNOWN_BYE_GRADE),
                diff: record.diff,
            });
        }
    }
    None
}
