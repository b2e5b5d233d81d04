// Trade engine: candidate filtering, position matching, lockout resolution,
// bye-round weighting, combination search, and recommendation orchestration.

pub mod brackets;
pub mod bye;
pub mod combos;
pub mod filter;
pub mod lockout;
pub mod names;
pub mod positions;
pub mod recommend;

use thiserror::Error;

/// Errors that reject a calculation up front. Lookup misses and empty
/// candidate pools are not errors; they degrade to warnings or empty
/// result lists.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("no trade-out players supplied")]
    NoTradeOuts,

    #[error("invalid reference time `{0}` (expected YYYY-MM-DDTHH:MM)")]
    InvalidReferenceTime(String),

    #[error("dataset snapshot is empty")]
    EmptyDataset,
}
