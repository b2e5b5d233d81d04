// Candidate pool filtering.
//
// Applies the availability filters to the raw snapshot, in a fixed order:
// latest round, valid projection, explicit exclusions, team restriction,
// lockout, allowed positions. Any stage that empties the pool
// short-circuits with an empty result; the caller treats that as "no
// options", not an error.

use std::collections::HashSet;

use tracing::warn;

use crate::model::{Dataset, PlayerRecord, Position};

/// Parameters for one filtering pass.
#[derive(Debug, Default)]
pub struct CandidateFilter<'a> {
    /// Player names excluded outright (traded-out players plus any explicit
    /// exclusion list).
    pub excluded: &'a [String],
    /// When present, only these players are considered.
    pub team_restriction: Option<&'a [String]>,
    /// Locked-out player names (empty when lockout is not applied).
    pub locked_out: Option<&'a HashSet<String>>,
    /// When present, candidates must play one of these (primary or
    /// secondary).
    pub allowed_positions: Option<&'a [Position]>,
    /// Drop players with a missing/zero projection (not named this round).
    pub require_projection: bool,
}

/// Filter the snapshot down to the candidate pool.
pub fn filter_candidates(dataset: &Dataset, filter: &CandidateFilter) -> Vec<PlayerRecord> {
    let mut pool: Vec<PlayerRecord> = dataset
        .latest_round_rows()
        .into_iter()
        .cloned()
        .collect();
    if pool.is_empty() {
        warn!("candidate pool empty: dataset has no rows in the latest round");
        return pool;
    }

    if filter.require_projection {
        pool.retain(|p| p.has_projection());
        if pool.is_empty() {
            warn!("candidate pool empty after dropping players with no projection");
            return pool;
        }
    }

    if !filter.excluded.is_empty() {
        pool.retain(|p| !filter.excluded.contains(&p.name));
        if pool.is_empty() {
            warn!("candidate pool empty after applying exclusions");
            return pool;
        }
    }

    if let Some(restriction) = filter.team_restriction {
        pool.retain(|p| restriction.contains(&p.name));
        if pool.is_empty() {
            warn!("candidate pool empty after applying team list restriction");
            return pool;
        }
    }

    if let Some(locked) = filter.locked_out {
        if !locked.is_empty() {
            pool.retain(|p| !locked.contains(&p.name));
            if pool.is_empty() {
                warn!("candidate pool empty after applying lockout restriction");
                return pool;
            }
        }
    }

    if let Some(allowed) = filter.allowed_positions {
        if !allowed.is_empty() {
            pool.retain(|p| p.plays_any(allowed));
            if pool.is_empty() {
                warn!("candidate pool empty after position filtering");
            }
        }
    }

    pool
}
