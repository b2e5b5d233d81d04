// Fixture-based lockout resolution.
//
// A team is locked once its fixture's kickoff is at or before the reference
// time; a player is locked if their most-recent-round team is locked. The
// reference time is compared in the competition's fixed timezone, so caller
// local times must be normalized first via `normalize_reference_time`.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};

use crate::model::Dataset;
use crate::trade::TradeError;

/// Format used for reference times throughout the lockout checks.
pub const REFERENCE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Format fixture kickoffs are written in (season.toml).
pub const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A scheduled fixture: kickoff time (competition timezone) and the two
/// participating team codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub kickoff: NaiveDateTime,
    pub teams: Vec<String>,
}

impl Fixture {
    /// Parse a fixture from its config representation.
    pub fn parse(kickoff: &str, teams: Vec<String>) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            kickoff: NaiveDateTime::parse_from_str(kickoff, KICKOFF_FORMAT)?,
            teams,
        })
    }
}

/// Convert a caller's local ISO timestamp plus UTC offset (minutes, as
/// reported by JavaScript `getTimezoneOffset`) into a reference time in the
/// competition timezone. Returns None when the input is absent or
/// malformed; callers treat that as "no lockout applied".
pub fn normalize_reference_time(
    local_iso: &str,
    utc_offset_minutes: i32,
    competition_utc_offset_hours: i32,
) -> Option<String> {
    let trimmed = local_iso.trim().trim_end_matches('Z');
    // Drop fractional seconds if present.
    let trimmed = trimmed.split('.').next().unwrap_or(trimmed);

    let local = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, REFERENCE_TIME_FORMAT))
        .ok()?;

    // JS offsets are minutes to add to local time to reach UTC.
    let utc = local + Duration::minutes(utc_offset_minutes as i64);
    let standardized = utc + Duration::hours(competition_utc_offset_hours as i64);
    Some(standardized.format(REFERENCE_TIME_FORMAT).to_string())
}

fn parse_reference(reference: &str) -> Result<NaiveDateTime, TradeError> {
    NaiveDateTime::parse_from_str(reference, REFERENCE_TIME_FORMAT)
        .map_err(|_| TradeError::InvalidReferenceTime(reference.to_string()))
}

/// The set of team codes whose fixture has kicked off at or before the
/// reference time.
pub fn locked_teams(
    reference: &str,
    fixtures: &[Fixture],
) -> Result<HashSet<String>, TradeError> {
    let reference = parse_reference(reference)?;
    let mut locked = HashSet::new();
    for fixture in fixtures {
        if fixture.kickoff <= reference {
            locked.extend(fixture.teams.iter().cloned());
        }
    }
    Ok(locked)
}

/// The set of player names locked out at the reference time, by
/// most-recent-round team membership. No reference time means no lockout.
pub fn locked_players(
    reference: Option<&str>,
    dataset: &Dataset,
    fixtures: &[Fixture],
) -> Result<HashSet<String>, TradeError> {
    let Some(reference) = reference else {
        return Ok(HashSet::new());
    };
    let teams = locked_teams(reference, fixtures)?;

    let mut players = HashSet::new();
    for record in dataset.latest_per_player().values() {
        if teams.contains(&record.team) {
            players.insert(record.name.clone());
        }
    }
    Ok(players)
}

/// Whether a single player is locked at the reference time. Unknown players
/// are not locked.
pub fn is_player_locked(
    name: &str,
    dataset: &Dataset,
    reference: Option<&str>,
    fixtures: &[Fixture],
) -> Result<bool, TradeError> {
    let Some(reference) = reference else {
        return Ok(false);
    };
    let Some(record) = dataset.latest_row_for(name) else {
        return Ok(false);
    };
    let teams = locked_teams(reference, fixtures)?;
    Ok(teams.contains(&record.team))
}

/// Map each team code to its kickoff order rank (1-based, lower = earlier).
/// Used for presentation ordering of rosters by lockout proximity.
pub fn fixture_rank_map(fixtures: &[Fixture]) -> HashMap<String, usize> {
    let mut ranks = HashMap::new();
    for (idx, fixture) in fixtures.iter().enumerate() {
        for team in &fixture.teams {
            ranks.insert(team.clone(), idx + 1);
        }
    }
    ranks
}
