// Core data model: positions, player records, dataset snapshots, strategies,
// and the request/result shapes consumed and produced by the trade engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// The six canonical playing positions used for trade position coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "HOK")]
    Hooker,
    #[serde(rename = "MID")]
    Middle,
    #[serde(rename = "EDG")]
    Edge,
    #[serde(rename = "HLF")]
    Halfback,
    #[serde(rename = "CTR")]
    Centre,
    #[serde(rename = "WFB")]
    WingFullback,
}

/// All six positions, in display order.
pub const ALL_POSITIONS: [Position; 6] = [
    Position::Hooker,
    Position::Middle,
    Position::Edge,
    Position::Halfback,
    Position::Centre,
    Position::WingFullback,
];

impl Position {
    /// Parse a position code into a Position enum. Case-insensitive.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HOK" => Some(Position::Hooker),
            "MID" => Some(Position::Middle),
            "EDG" => Some(Position::Edge),
            "HLF" => Some(Position::Halfback),
            "CTR" => Some(Position::Centre),
            "WFB" => Some(Position::WingFullback),
            _ => None,
        }
    }

    /// Return the display code for this position.
    pub fn code(&self) -> &'static str {
        match self {
            Position::Hooker => "HOK",
            Position::Middle => "MID",
            Position::Edge => "EDG",
            Position::Halfback => "HLF",
            Position::Centre => "CTR",
            Position::WingFullback => "WFB",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Trade-in optimization strategy. Selected once at entry; the string codes
/// `"1"`/`"2"`/`"3"` used on the wire map onto the variants here so typos
/// fail at the boundary instead of deep inside the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Maximize value score (Diff).
    MaximizeValue,
    /// Maximize projected score.
    MaximizeBase,
    /// Tiered price-bracket x value-window priority ranking.
    Hybrid,
}

impl Strategy {
    /// Parse a strategy selector. Accepts the legacy numeric codes as well
    /// as readable names.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "value" => Some(Strategy::MaximizeValue),
            "2" | "base" | "projection" => Some(Strategy::MaximizeBase),
            "3" | "hybrid" => Some(Strategy::Hybrid),
            _ => None,
        }
    }

    /// The per-player metric this strategy ranks by: projection for
    /// `MaximizeBase`, value score otherwise.
    pub fn value_metric(&self, record: &PlayerRecord) -> f64 {
        match self {
            Strategy::MaximizeBase => record.projection,
            _ => record.diff,
        }
    }
}

// ---------------------------------------------------------------------------
// Player records and dataset snapshots
// ---------------------------------------------------------------------------

/// A single player-round row from the dataset snapshot. All optional columns
/// are default-filled at ingestion, never downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub secondary_position: Option<Position>,
    pub price: i64,
    pub diff: f64,
    pub projection: f64,
    pub injured: bool,
    /// Bye-round coverage grade, 1 (worst) to 4 (best). None = unknown.
    pub bye_grade: Option<u8>,
    pub round: u32,
}

impl PlayerRecord {
    /// The positions this player can fill (primary, plus secondary if any).
    pub fn positions(&self) -> Vec<Position> {
        let mut ps = vec![self.position];
        if let Some(sec) = self.secondary_position {
            ps.push(sec);
        }
        ps
    }

    /// Whether the player can fill at least one of `wanted`.
    pub fn plays_any(&self, wanted: &[Position]) -> bool {
        wanted.iter().any(|p| self.positions().contains(p))
    }

    /// A player with a missing or zero projection was not named this round.
    pub fn has_projection(&self) -> bool {
        self.projection != 0.0 && self.projection.is_finite()
    }
}

/// An immutable dataset snapshot: every player-round row loaded from the
/// store. Calculations read from this and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<PlayerRecord>,
}

impl Dataset {
    pub fn new(rows: Vec<PlayerRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PlayerRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The highest round present in the snapshot, or None if empty.
    pub fn latest_round(&self) -> Option<u32> {
        self.rows.iter().map(|r| r.round).max()
    }

    /// All rows belonging to the latest round. Only these rows are used for
    /// trade calculations.
    pub fn latest_round_rows(&self) -> Vec<&PlayerRecord> {
        match self.latest_round() {
            Some(latest) => self.rows.iter().filter(|r| r.round == latest).collect(),
            None => Vec::new(),
        }
    }

    /// Each player's most recent row, keyed by name. Historical rows exist
    /// only for this lookup (team assignment, last known price).
    pub fn latest_per_player(&self) -> HashMap<&str, &PlayerRecord> {
        let mut latest: HashMap<&str, &PlayerRecord> = HashMap::new();
        for row in &self.rows {
            match latest.get(row.name.as_str()) {
                Some(existing) if existing.round >= row.round => {}
                _ => {
                    latest.insert(row.name.as_str(), row);
                }
            }
        }
        latest
    }

    /// The most recent row for a single player, if present.
    pub fn latest_row_for(&self, name: &str) -> Option<&PlayerRecord> {
        self.rows
            .iter()
            .filter(|r| r.name == name)
            .max_by_key(|r| r.round)
    }

    /// Whether any row carries a known bye grade.
    pub fn has_bye_grades(&self) -> bool {
        self.rows.iter().any(|r| r.bye_grade.is_some())
    }
}

// ---------------------------------------------------------------------------
// Trade requests
// ---------------------------------------------------------------------------

/// One player being removed from the roster. `trade_in_positions`, when
/// given, takes precedence over the slot-derived position requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutRequest {
    pub name: String,
    /// The roster slot the player occupies (e.g. "MID", "INT", "EMG").
    #[serde(default)]
    pub slot_position: Option<String>,
    /// Explicit acceptable replacement positions.
    #[serde(default)]
    pub trade_in_positions: Option<Vec<Position>>,
    /// Price override from the caller; when absent the latest-round price
    /// from the dataset is used.
    #[serde(default)]
    pub price: Option<i64>,
}

impl TradeOutRequest {
    /// A request carrying only a player name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot_position: None,
            trade_in_positions: None,
            price: None,
        }
    }
}

/// A derived per-slot requirement: the positions a replacement for this
/// trade-out must be able to play. Empty = any position acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRequirement {
    pub player_name: String,
    pub required: Vec<Position>,
}

// ---------------------------------------------------------------------------
// Trade combinations (results)
// ---------------------------------------------------------------------------

/// A player inside a returned trade combination, shaped for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationPlayer {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub secondary_position: Option<Position>,
    pub price: i64,
    pub projection: f64,
    pub diff: f64,
    pub bye_round_grade: Option<u8>,
}

impl From<&PlayerRecord> for CombinationPlayer {
    fn from(r: &PlayerRecord) -> Self {
        Self {
            name: r.name.clone(),
            team: r.team.clone(),
            position: r.position,
            secondary_position: r.secondary_position,
            price: r.price,
            projection: r.projection,
            diff: r.diff,
            bye_round_grade: r.bye_grade,
        }
    }
}

/// An accepted trade combination with its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeCombination {
    pub players: Vec<CombinationPlayer>,
    pub total_price: i64,
    pub total_projection: f64,
    pub total_diff: f64,
    pub salary_remaining: i64,
}

impl TradeCombination {
    /// Assemble a combination from its members and the salary freed by the
    /// trade-outs.
    pub fn assemble(players: &[&PlayerRecord], salary_freed: i64) -> Self {
        let total_price: i64 = players.iter().map(|p| p.price).sum();
        Self {
            players: players.iter().map(|&p| CombinationPlayer::from(p)).collect(),
            total_price,
            total_projection: players.iter().map(|p| p.projection).sum(),
            total_diff: players.iter().map(|p| p.diff).sum(),
            salary_remaining: salary_freed - total_price,
        }
    }
}
