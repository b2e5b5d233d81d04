// Recommendation orchestration: which players to drop, and which to bring
// in with the salary they free up.
//
// Trade-out selection priority: injured, then not selected this round, then
// lowest value score, then junk cheapies. Preseason mode never recommends
// trading a healthy, fairly-valued, selected player.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{
    Dataset, PlayerRecord, Position, PositionRequirement, Strategy, TradeCombination,
    TradeOutRequest,
};
use crate::trade::bye::{self, ByeMode, ByeWeighted};
use crate::trade::combos::{self, ComboRequest, DEFAULT_MAX_OPTIONS};
use crate::trade::filter::{filter_candidates, CandidateFilter};
use crate::trade::lockout::{locked_players, Fixture};
use crate::trade::names::expand_abbreviated;
use crate::trade::positions::PositionRequirements;
use crate::trade::TradeError;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A roster player as supplied by the upstream roster extraction. Names may
/// be abbreviated ("E. Clark"); prices are the caller's view of the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPlayer {
    pub name: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    pub price: i64,
}

/// Thresholds governing automatic trade-out selection.
#[derive(Debug, Clone, Copy)]
pub struct TradeOutThresholds {
    /// Below this price a player can be a "junk cheapie".
    pub junk_price: i64,
    /// Below this value score a cheap player is junk.
    pub junk_upside: f64,
    /// Below this value score a player counts as overvalued (preseason).
    pub overvalued_diff: f64,
}

impl Default for TradeOutThresholds {
    fn default() -> Self {
        Self {
            junk_price: 350_000,
            junk_upside: 5.0,
            overvalued_diff: -2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Trade-out candidates
// ---------------------------------------------------------------------------

/// Why a player was selected for trading out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutReason {
    Injured,
    NotSelected,
    LowUpside,
    JunkCheap,
}

/// A recommended trade-out, keyed by the caller's (possibly abbreviated)
/// display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutCandidate {
    pub name: String,
    pub positions: Vec<Position>,
    pub price: i64,
    pub reason: TradeOutReason,
    pub diff: Option<f64>,
    #[serde(default)]
    pub projection: f64,
    pub bye_round_grade: Option<u8>,
    pub is_injured: bool,
    pub non_playing: bool,
}

impl ByeWeighted for TradeOutCandidate {
    fn is_injured(&self) -> bool {
        self.is_injured
    }
    fn non_playing(&self) -> bool {
        self.non_playing
    }
    fn bye_grade(&self) -> Option<u8> {
        self.bye_round_grade
    }
    fn diff(&self) -> f64 {
        self.diff.unwrap_or(0.0)
    }
    fn projection(&self) -> f64 {
        self.projection
    }
}

// ---------------------------------------------------------------------------
// Name resolution helpers
// ---------------------------------------------------------------------------

/// Abbreviated -> full and full -> abbreviated name maps for a squad.
fn name_mappings(
    team_players: &[TeamPlayer],
    dataset: &Dataset,
) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut forward = HashMap::new();
    let mut reverse = HashMap::new();
    for player in team_players {
        let full = expand_abbreviated(&player.name, dataset);
        forward.insert(player.name.clone(), full.clone());
        reverse.insert(full, player.name.clone());
    }
    (forward, reverse)
}

/// Squad members flagged injured in the latest round of the dataset.
/// Returned as the caller's display names.
pub fn identify_injured(team_players: &[TeamPlayer], dataset: &Dataset) -> Vec<String> {
    let (forward, _) = name_mappings(team_players, dataset);
    let injured_in_data: HashSet<&str> = dataset
        .latest_round_rows()
        .into_iter()
        .filter(|r| r.injured)
        .map(|r| r.name.as_str())
        .collect();

    team_players
        .iter()
        .filter(|p| {
            forward
                .get(&p.name)
                .is_some_and(|full| injured_in_data.contains(full.as_str()))
        })
        .map(|p| p.name.clone())
        .collect()
}

/// Squad members absent from the latest round, or present with no
/// projection: "not selected" this round.
pub fn identify_not_selected(team_players: &[TeamPlayer], dataset: &Dataset) -> Vec<String> {
    let (forward, _) = name_mappings(team_players, dataset);
    let latest: HashMap<&str, &PlayerRecord> = dataset
        .latest_round_rows()
        .into_iter()
        .map(|r| (r.name.as_str(), r))
        .collect();

    team_players
        .iter()
        .filter(|p| {
            let full = forward.get(&p.name).unwrap_or(&p.name);
            match latest.get(full.as_str()) {
                Some(row) => !row.has_projection(),
                None => true,
            }
        })
        .map(|p| p.name.clone())
        .collect()
}

/// Cheap players with little upside: priced under the junk threshold with a
/// value score under the upside threshold. Ordered cheapest first, then
/// least upside.
pub fn identify_junk_cheapies(
    team_players: &[TeamPlayer],
    dataset: &Dataset,
    thresholds: &TradeOutThresholds,
    exclude_names: &[String],
) -> Vec<TradeOutCandidate> {
    let (forward, reverse) = name_mappings(team_players, dataset);
    let full_names: HashSet<&String> = forward.values().collect();
    let excluded_full: HashSet<String> = exclude_names
        .iter()
        .map(|n| expand_abbreviated(n, dataset))
        .collect();

    let mut rows: Vec<&PlayerRecord> = dataset
        .latest_round_rows()
        .into_iter()
        .filter(|r| full_names.contains(&r.name) && !excluded_full.contains(&r.name))
        .filter(|r| r.price < thresholds.junk_price && r.diff < thresholds.junk_upside)
        .collect();
    rows.sort_by(|a, b| a.price.cmp(&b.price).then(a.diff.total_cmp(&b.diff)));

    rows.into_iter()
        .map(|row| {
            let display = reverse.get(&row.name).cloned().unwrap_or(row.name.clone());
            let price = team_players
                .iter()
                .find(|p| p.name == display)
                .map(|p| p.price)
                .unwrap_or(row.price);
            TradeOutCandidate {
                name: display,
                positions: row.positions(),
                price,
                reason: TradeOutReason::JunkCheap,
                diff: Some(row.diff),
                projection: row.projection,
                bye_round_grade: row.bye_grade,
                is_injured: row.injured,
                non_playing: !row.has_projection(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trade-out selection
// ---------------------------------------------------------------------------

/// Select which squad players to trade out.
///
/// With bye targeting, the whole squad is ranked with the bye-weighted
/// trade-out key instead of the stepwise priority fill. Preseason mode only
/// considers injured, overvalued, or not-selected players.
pub fn select_trade_outs(
    team_players: &[TeamPlayer],
    dataset: &Dataset,
    num_trades: usize,
    strategy: Strategy,
    target_bye_round: bool,
    preseason_mode: bool,
    thresholds: &TradeOutThresholds,
) -> Vec<TradeOutCandidate> {
    if team_players.is_empty() {
        warn!("trade-out selection called with an empty squad");
        return Vec::new();
    }

    let (forward, reverse) = name_mappings(team_players, dataset);
    let injured: HashSet<String> = identify_injured(team_players, dataset).into_iter().collect();
    let not_selected: HashSet<String> = identify_not_selected(team_players, dataset)
        .into_iter()
        .collect();

    if target_bye_round {
        return select_trade_outs_bye_weighted(
            team_players,
            dataset,
            num_trades,
            strategy,
            preseason_mode,
            thresholds,
            &forward,
            &reverse,
            &injured,
            &not_selected,
        );
    }

    let mut candidates: Vec<TradeOutCandidate> = Vec::new();
    let mut selected: HashSet<String> = HashSet::new();

    // Injured players first.
    for player in team_players {
        if candidates.len() >= num_trades {
            break;
        }
        if injured.contains(&player.name) {
            candidates.push(TradeOutCandidate {
                name: player.name.clone(),
                positions: player.positions.clone(),
                price: player.price,
                reason: TradeOutReason::Injured,
                diff: None,
                projection: 0.0,
                bye_round_grade: None,
                is_injured: true,
                non_playing: false,
            });
            selected.insert(player.name.clone());
        }
    }

    // Then players not named this round.
    for player in team_players {
        if candidates.len() >= num_trades {
            break;
        }
        if selected.contains(&player.name) || !not_selected.contains(&player.name) {
            continue;
        }
        candidates.push(TradeOutCandidate {
            name: player.name.clone(),
            positions: player.positions.clone(),
            price: player.price,
            reason: TradeOutReason::NotSelected,
            diff: None,
            projection: 0.0,
            bye_round_grade: None,
            is_injured: false,
            non_playing: true,
        });
        selected.insert(player.name.clone());
    }

    // Then lowest upside. Preseason mode only surfaces overvalued players.
    if candidates.len() < num_trades {
        let selected_full: HashSet<String> = selected
            .iter()
            .map(|n| forward.get(n).cloned().unwrap_or_else(|| n.clone()))
            .collect();
        let full_names: HashSet<&String> = forward.values().collect();

        let mut rows: Vec<&PlayerRecord> = dataset
            .latest_round_rows()
            .into_iter()
            .filter(|r| full_names.contains(&r.name) && !selected_full.contains(&r.name))
            .collect();
        if preseason_mode {
            rows.retain(|r| r.diff < thresholds.overvalued_diff);
        }
        rows.sort_by(|a, b| a.diff.total_cmp(&b.diff));

        for row in rows {
            if candidates.len() >= num_trades {
                break;
            }
            let display = reverse.get(&row.name).cloned().unwrap_or(row.name.clone());
            let price = team_players
                .iter()
                .find(|p| p.name == display)
                .map(|p| p.price)
                .unwrap_or(row.price);
            candidates.push(TradeOutCandidate {
                name: display.clone(),
                positions: row.positions(),
                price,
                reason: TradeOutReason::LowUpside,
                diff: Some(row.diff),
                projection: row.projection,
                bye_round_grade: row.bye_grade,
                is_injured: false,
                non_playing: false,
            });
            selected.insert(display);
        }
    }

    // Finally junk cheapies, lowest priority. Skipped in preseason mode:
    // a cheap player is not by itself injured/overvalued/unselected.
    if candidates.len() < num_trades && !preseason_mode {
        let exclude: Vec<String> = selected.iter().cloned().collect();
        for junk in identify_junk_cheapies(team_players, dataset, thresholds, &exclude) {
            if candidates.len() >= num_trades {
                break;
            }
            candidates.push(junk);
        }
    }

    candidates.truncate(num_trades);
    candidates
}

#[allow(clippy::too_many_arguments)]
fn select_trade_outs_bye_weighted(
    team_players: &[TeamPlayer],
    dataset: &Dataset,
    num_trades: usize,
    strategy: Strategy,
    preseason_mode: bool,
    thresholds: &TradeOutThresholds,
    forward: &HashMap<String, String>,
    reverse: &HashMap<String, String>,
    injured: &HashSet<String>,
    not_selected: &HashSet<String>,
) -> Vec<TradeOutCandidate> {
    let full_names: HashSet<&String> = forward.values().collect();
    let mut candidates: Vec<TradeOutCandidate> = Vec::new();
    let mut present_full: HashSet<String> = HashSet::new();

    for row in dataset.latest_round_rows() {
        if !full_names.contains(&row.name) {
            continue;
        }
        present_full.insert(row.name.clone());
        let display = reverse.get(&row.name).cloned().unwrap_or(row.name.clone());
        let is_injured = injured.contains(&display);
        let is_not_selected = not_selected.contains(&display);
        let is_overvalued = row.diff < thresholds.overvalued_diff;

        if preseason_mode && !(is_injured || is_not_selected || is_overvalued) {
            continue;
        }

        let reason = if is_injured {
            TradeOutReason::Injured
        } else if is_not_selected {
            TradeOutReason::NotSelected
        } else {
            TradeOutReason::LowUpside
        };

        let price = team_players
            .iter()
            .find(|p| p.name == display)
            .map(|p| p.price)
            .unwrap_or(row.price);

        candidates.push(TradeOutCandidate {
            name: display,
            positions: row.positions(),
            price,
            reason,
            diff: Some(row.diff),
            projection: row.projection,
            bye_round_grade: row.bye_grade,
            is_injured,
            non_playing: is_not_selected,
        });
    }

    // Squad members missing from the latest round are always "not selected".
    for player in team_players {
        let full = forward.get(&player.name).unwrap_or(&player.name);
        if present_full.contains(full) {
            continue;
        }
        let is_injured = injured.contains(&player.name);
        candidates.push(TradeOutCandidate {
            name: player.name.clone(),
            positions: player.positions.clone(),
            price: player.price,
            reason: if is_injured {
                TradeOutReason::Injured
            } else {
                TradeOutReason::NotSelected
            },
            diff: Some(0.0),
            projection: 0.0,
            bye_round_grade: None,
            is_injured,
            non_playing: true,
        });
    }

    let weighted = bye::reweight(&candidates, ByeMode::TradeOut, strategy);
    weighted.into_iter().take(num_trades).collect()
}

// ---------------------------------------------------------------------------
// Trade-in calculation
// ---------------------------------------------------------------------------

/// Options for a trade-in calculation.
#[derive(Debug)]
pub struct TradeOptions<'a> {
    pub strategy: Strategy,
    pub max_options: usize,
    pub allowed_positions: Option<Vec<Position>>,
    /// When present, only these players are eligible trade-in targets.
    pub team_restriction: Option<Vec<String>>,
    /// Normalized reference time for lockout checks.
    pub reference_time: Option<String>,
    pub apply_lockout: bool,
    pub excluded_players: Vec<String>,
    pub cash_in_bank: i64,
    pub target_bye_round: bool,
    pub fixtures: &'a [Fixture],
}

impl<'a> TradeOptions<'a> {
    pub fn new(strategy: Strategy, fixtures: &'a [Fixture]) -> Self {
        Self {
            strategy,
            max_options: DEFAULT_MAX_OPTIONS,
            allowed_positions: None,
            team_restriction: None,
            reference_time: None,
            apply_lockout: false,
            excluded_players: Vec::new(),
            cash_in_bank: 0,
            target_bye_round: false,
            fixtures,
        }
    }
}

/// Resolve the per-slot position requirements for a set of trade-outs.
/// Explicit trade-in positions win; otherwise a concrete slot (not INT/EMG)
/// or a plain name request derives the player's primary position; INT/EMG
/// slots derive no requirement.
fn derive_requirements(requests: &[TradeOutRequest], dataset: &Dataset) -> Vec<PositionRequirement> {
    requests
        .iter()
        .map(|req| {
            let required = match &req.trade_in_positions {
                Some(positions) if !positions.is_empty() => positions.clone(),
                _ => match req.slot_position.as_deref() {
                    Some("INT") | Some("EMG") => Vec::new(),
                    _ => dataset
                        .latest_row_for(&req.name)
                        .map(|row| vec![row.position])
                        .unwrap_or_default(),
                },
            };
            PositionRequirement {
                player_name: req.name.clone(),
                required,
            }
        })
        .collect()
}

/// Calculate ranked trade-in combinations for a set of trade-outs.
pub fn calculate_trade_options(
    dataset: &Dataset,
    requests: &[TradeOutRequest],
    options: &TradeOptions,
) -> Result<Vec<TradeCombination>, TradeError> {
    if requests.is_empty() {
        return Err(TradeError::NoTradeOuts);
    }
    if dataset.is_empty() {
        return Err(TradeError::EmptyDataset);
    }

    // Expand abbreviated names before any lookup.
    let requests: Vec<TradeOutRequest> = requests
        .iter()
        .map(|r| TradeOutRequest {
            name: expand_abbreviated(&r.name, dataset),
            ..r.clone()
        })
        .collect();

    let locked = if options.apply_lockout {
        locked_players(options.reference_time.as_deref(), dataset, options.fixtures)?
    } else {
        HashSet::new()
    };

    let requirements = PositionRequirements::per_slot(derive_requirements(&requests, dataset));

    // Salary freed: caller-supplied prices win; otherwise the latest-round
    // price. An unresolved price degrades to zero rather than aborting.
    let mut salary_freed = options.cash_in_bank;
    let mut traded_out_names: Vec<String> = Vec::new();
    for req in &requests {
        traded_out_names.push(req.name.clone());
        let price = req.price.or_else(|| {
            dataset.latest_row_for(&req.name).map(|row| row.price)
        });
        match price {
            Some(p) => salary_freed += p,
            None => warn!(player = %req.name, "no price data found; treating as zero"),
        }
    }
    info!(
        salary_freed,
        cash_in_bank = options.cash_in_bank,
        players = requests.len(),
        "calculating trade options"
    );

    let mut excluded = traded_out_names;
    excluded.extend(options.excluded_players.iter().cloned());

    let pool = filter_candidates(
        dataset,
        &CandidateFilter {
            excluded: &excluded,
            team_restriction: options.team_restriction.as_deref(),
            locked_out: Some(&locked),
            allowed_positions: options.allowed_positions.as_deref(),
            require_projection: true,
        },
    );
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    // Bye targeting: only graded players are comparable; the weighted order
    // replaces the strategy pre-sort.
    let pool = if options.target_bye_round {
        let graded: Vec<PlayerRecord> =
            pool.into_iter().filter(|p| p.bye_grade.is_some()).collect();
        let weighted = bye::reweight(&graded, ByeMode::TradeIn, options.strategy);
        if weighted.is_empty() {
            warn!("no candidates remain after bye-round weighting");
            return Ok(Vec::new());
        }
        weighted
    } else {
        pool
    };

    Ok(combos::generate(
        &pool,
        &ComboRequest {
            budget: salary_freed,
            strategy: options.strategy,
            requirements: &requirements,
            slots_needed: requests.len(),
            max_options: options.max_options,
            target_bye_round: options.target_bye_round,
        },
    ))
}

// ---------------------------------------------------------------------------
// Combined recommendations
// ---------------------------------------------------------------------------

/// A full recommendation: who to drop, who to bring in, and the budget the
/// swap operates under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub trade_out: Vec<TradeOutCandidate>,
    pub trade_in: Vec<TradeCombination>,
    pub total_salary_freed: i64,
}

/// Parameters for a combined trade-out + trade-in recommendation.
#[derive(Debug)]
pub struct RecommendParams<'a> {
    pub strategy: Strategy,
    pub num_trades: usize,
    pub cash_in_bank: i64,
    pub allowed_positions: Option<Vec<Position>>,
    pub reference_time: Option<String>,
    pub apply_lockout: bool,
    pub excluded_players: Vec<String>,
    pub target_bye_round: bool,
    pub preseason_mode: bool,
    /// Bypass automatic selection with a caller-chosen trade-out list.
    pub preselected_trade_outs: Option<Vec<TradeOutCandidate>>,
    pub thresholds: TradeOutThresholds,
    pub fixtures: &'a [Fixture],
}

/// Compute trade-out and trade-in recommendations for a squad.
pub fn recommend_trades(
    team_players: &[TeamPlayer],
    dataset: &Dataset,
    params: &RecommendParams,
) -> Result<TradeRecommendation, TradeError> {
    let trade_out = match &params.preselected_trade_outs {
        Some(preselected) => {
            info!(count = preselected.len(), "using pre-selected trade-outs");
            preselected.clone()
        }
        None => select_trade_outs(
            team_players,
            dataset,
            params.num_trades,
            params.strategy,
            params.target_bye_round,
            params.preseason_mode,
            &params.thresholds,
        ),
    };

    let total_salary_freed: i64 =
        params.cash_in_bank + trade_out.iter().map(|c| c.price).sum::<i64>();

    // Injured players are never acquisition targets in a combined
    // recommendation.
    let non_injured: Vec<String> = dataset
        .latest_round_rows()
        .into_iter()
        .filter(|r| !r.injured)
        .map(|r| r.name.clone())
        .collect();

    let requests: Vec<TradeOutRequest> = trade_out
        .iter()
        .map(|c| TradeOutRequest {
            name: c.name.clone(),
            slot_position: None,
            trade_in_positions: if c.positions.is_empty() {
                None
            } else {
                Some(c.positions.clone())
            },
            price: Some(c.price),
        })
        .collect();

    let trade_in = if requests.is_empty() {
        Vec::new()
    } else {
        calculate_trade_options(
            dataset,
            &requests,
            &TradeOptions {
                strategy: params.strategy,
                max_options: DEFAULT_MAX_OPTIONS,
                allowed_positions: params.allowed_positions.clone(),
                team_restriction: Some(non_injured),
                reference_time: params.reference_time.clone(),
                apply_lockout: params.apply_lockout,
                excluded_players: params.excluded_players.clone(),
                cash_in_bank: params.cash_in_bank,
                target_bye_round: params.target_bye_round,
                fixtures: params.fixtures,
            },
        )?
    };

    Ok(TradeRecommendation {
        trade_out,
        trade_in,
        total_salary_freed,
    })
}

// ---------------------------------------------------------------------------
// Preseason candidate lists
// ---------------------------------------------------------------------------

/// Margin either side of a trade-out's price when band filtering.
const PRICE_BAND_MARGIN: i64 = 75_000;

/// Minimum value score for a band to count as containing real options.
const BAND_MIN_DIFF: f64 = 7.0;

/// Bands cascade downward at most this many steps before falling back.
const MAX_BAND_OFFSET: u32 = 10;

/// A resolved price band for one trade-out slot.
#[derive(Debug, Clone, Serialize)]
pub struct PriceBand {
    pub player_name: String,
    pub required_positions: Vec<Position>,
    pub min_price: i64,
    pub max_price: i64,
    pub band_offset: u32,
}

/// A flat preseason trade-in candidate (individual players, not pairs).
#[derive(Debug, Clone, Serialize)]
pub struct PreseasonCandidate {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub positions: Vec<Position>,
    pub price: i64,
    pub diff: f64,
    pub projection: f64,
    pub bye_round_grade: Option<u8>,
    /// Which trade-out slots this candidate's price and positions fit
    /// (band mode only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matching_bands: Vec<String>,
}

/// Parameters for the preseason candidate list.
#[derive(Debug)]
pub struct PreseasonParams {
    pub salary_cap: i64,
    pub strategy: Strategy,
    pub allowed_positions: Vec<Position>,
    pub excluded_players: Vec<String>,
    pub target_bye_round: bool,
    pub max_results: usize,
    /// Filter by cascading per-slot price bands instead of the salary cap.
    pub price_bands: bool,
    pub trade_outs: Vec<TradeOutRequest>,
}

fn band_required_positions(req: &TradeOutRequest, dataset: &Dataset) -> Vec<Position> {
    match &req.trade_in_positions {
        Some(positions) if !positions.is_empty() => positions.clone(),
        _ => match req.slot_position.as_deref().and_then(Position::from_code) {
            Some(pos) => vec![pos],
            None => dataset
                .latest_row_for(&req.name)
                .map(|row| vec![row.position])
                .unwrap_or_default(),
        },
    }
}

/// Resolve a cascading price band for one trade-out: start at +/- the
/// margin around the player's price and step downward until the band holds
/// players with real upside matching the slot's positions. Falls back to
/// the original band when nothing qualifies.
fn resolve_band(
    req: &TradeOutRequest,
    pool: &[PlayerRecord],
    dataset: &Dataset,
) -> Option<PriceBand> {
    let center = req
        .price
        .or_else(|| dataset.latest_row_for(&req.name).map(|r| r.price))
        .unwrap_or(0);
    if center <= 0 {
        return None;
    }
    let required = band_required_positions(req, dataset);

    for offset in 0..MAX_BAND_OFFSET {
        let (min_price, max_price) = band_range(center, offset);
        let has_options = pool.iter().any(|p| {
            p.price >= min_price
                && p.price <= max_price
                && p.diff >= BAND_MIN_DIFF
                && (required.is_empty() || p.plays_any(&required))
        });
        if has_options {
            return Some(PriceBand {
                player_name: req.name.clone(),
                required_positions: required,
                min_price,
                max_price,
                band_offset: offset,
            });
        }
    }

    // Fallback: the original band, even with no qualifying players.
    let (min_price, max_price) = band_range(center, 0);
    Some(PriceBand {
        player_name: req.name.clone(),
        required_positions: required,
        min_price,
        max_price,
        band_offset: MAX_BAND_OFFSET,
    })
}

fn band_range(center: i64, offset: u32) -> (i64, i64) {
    if offset == 0 {
        (center - PRICE_BAND_MARGIN, center + PRICE_BAND_MARGIN)
    } else {
        (
            center - PRICE_BAND_MARGIN * (offset as i64 + 1),
            center - PRICE_BAND_MARGIN * offset as i64,
        )
    }
}

/// Individual trade-in candidates for preseason planning, ranked by
/// strategy. Injured and non-selected players are excluded up front.
pub fn preseason_trade_in_candidates(
    dataset: &Dataset,
    params: &PreseasonParams,
) -> Vec<PreseasonCandidate> {
    let traded_out: Vec<String> = params
        .trade_outs
        .iter()
        .map(|r| expand_abbreviated(&r.name, dataset))
        .collect();

    let mut pool: Vec<PlayerRecord> = dataset
        .latest_round_rows()
        .into_iter()
        .filter(|r| !r.injured && r.has_projection())
        .filter(|r| !params.excluded_players.contains(&r.name))
        .filter(|r| !traded_out.contains(&r.name))
        .cloned()
        .collect();

    let bands: Vec<PriceBand> = if params.price_bands {
        params
            .trade_outs
            .iter()
            .filter_map(|req| resolve_band(req, &pool, dataset))
            .collect()
    } else {
        Vec::new()
    };

    if params.price_bands && !bands.is_empty() {
        pool.retain(|p| {
            p.diff >= BAND_MIN_DIFF
                && bands
                    .iter()
                    .any(|b| p.price >= b.min_price && p.price <= b.max_price)
        });
    } else {
        pool.retain(|p| p.price <= params.salary_cap);
    }

    // Union of per-slot position requirements from the trade-outs.
    let mut slot_positions: Vec<Position> = Vec::new();
    for req in &params.trade_outs {
        if let Some(positions) = &req.trade_in_positions {
            for &pos in positions {
                if !slot_positions.contains(&pos) {
                    slot_positions.push(pos);
                }
            }
        }
    }
    if !slot_positions.is_empty() {
        pool.retain(|p| p.plays_any(&slot_positions));
    }

    if !params.price_bands && !params.allowed_positions.is_empty() {
        pool.retain(|p| p.plays_any(&params.allowed_positions));
    }

    match params.strategy {
        Strategy::MaximizeBase => pool.sort_by(|a, b| b.projection.total_cmp(&a.projection)),
        Strategy::Hybrid => {
            // Normalized 50/50 blend of the two metrics.
            let max_diff = pool.iter().map(|p| p.diff).fold(f64::MIN, f64::max).max(1.0);
            let max_proj = pool
                .iter()
                .map(|p| p.projection)
                .fold(f64::MIN, f64::max)
                .max(1.0);
            let score =
                |p: &PlayerRecord| (p.diff / max_diff) * 0.5 + (p.projection / max_proj) * 0.5;
            pool.sort_by(|a, b| score(b).total_cmp(&score(a)));
        }
        Strategy::MaximizeValue => pool.sort_by(|a, b| b.diff.total_cmp(&a.diff)),
    }

    // Band mode returns everything in range; cap mode trims first.
    if !params.price_bands {
        pool.truncate(params.max_results);
    }

    if params.target_bye_round {
        pool = bye::reweight(&pool, ByeMode::TradeIn, params.strategy);
    }

    let candidates: Vec<PreseasonCandidate> = pool
        .iter()
        .map(|p| {
            let matching_bands = bands
                .iter()
                .filter(|b| {
                    p.price >= b.min_price
                        && p.price <= b.max_price
                        && (b.required_positions.is_empty() || p.plays_any(&b.required_positions))
                })
                .map(|b| b.player_name.clone())
                .collect();
            PreseasonCandidate {
                name: p.name.clone(),
                team: p.team.clone(),
                position: p.position,
                positions: p.positions(),
                price: p.price,
                diff: p.diff,
                projection: p.projection,
                bye_round_grade: p.bye_grade,
                matching_bands,
            }
        })
        .collect();

    if params.price_bands {
        candidates
    } else {
        candidates.into_iter().take(params.max_results).collect()
    }
}
