// SQLite persistence layer for player-round statistics.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::model::{Dataset, PlayerRecord, Position};

/// Required columns in a season data export. Import refuses files missing
/// any of these.
const REQUIRED_COLUMNS: [&str; 7] = [
    "Round",
    "Team",
    "POS1",
    "Player",
    "Price",
    "Diff",
    "Projection",
];

/// Accepted header spellings for the bye-round grading column.
const BYE_GRADE_ALIASES: [&str; 3] = ["Bye_Round_Grading", "Bye Round Grading", "Bye_round_grade"];

/// SQLite-backed persistence for player-round statistics snapshots.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS player_stats (
                player     TEXT NOT NULL,
                team       TEXT NOT NULL,
                pos1       TEXT NOT NULL,
                pos2       TEXT,
                price      INTEGER NOT NULL,
                diff       REAL NOT NULL,
                projection REAL NOT NULL,
                injured    INTEGER NOT NULL DEFAULT 0,
                bye_grade  INTEGER,
                round      INTEGER NOT NULL,
                PRIMARY KEY (player, round)
            );

            CREATE INDEX IF NOT EXISTS idx_player_stats_round ON player_stats(round);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Import a season data export (CSV), replacing any existing rows for
    /// the same (player, round) pairs. Returns the number of rows imported.
    pub fn import_csv(&self, path: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open csv at {}", path.display()))?;

        let headers = reader
            .headers()
            .context("failed to read csv headers")?
            .clone();
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                bail!("csv is missing required column `{required}`");
            }
        }
        let col = |name: &str| headers.iter().position(|h| h == name);
        let round_col = col("Round").unwrap_or_default();
        let team_col = col("Team").unwrap_or_default();
        let pos1_col = col("POS1").unwrap_or_default();
        let player_col = col("Player").unwrap_or_default();
        let price_col = col("Price").unwrap_or_default();
        let diff_col = col("Diff").unwrap_or_default();
        let projection_col = col("Projection").unwrap_or_default();
        let pos2_col = col("POS2");
        let injured_col = col("Injured");
        let bye_col = BYE_GRADE_ALIASES.iter().find_map(|alias| col(alias));
        if bye_col.is_none() {
            info!("no bye-round grading column in export; grades will be unknown");
        }

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        let mut imported = 0usize;

        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("failed to read csv record {line}"))?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let player = field(player_col);
            if player.is_empty() {
                warn!(line, "skipping csv row with empty player name");
                continue;
            }
            let round: u32 = field(round_col)
                .parse()
                .with_context(|| format!("invalid Round value on row {line}"))?;
            let price: i64 = parse_price(field(price_col))
                .with_context(|| format!("invalid Price value on row {line}"))?;
            let diff: f64 = field(diff_col).parse().unwrap_or(0.0);
            let projection: f64 = field(projection_col).parse().unwrap_or(0.0);
            let pos2 = pos2_col.map(field).filter(|s| !s.is_empty());
            let injured = injured_col.map(field).map(parse_injured).unwrap_or(false);
            let bye_grade: Option<i64> = bye_col.map(field).and_then(|s| s.parse().ok());

            tx.execute(
                "INSERT OR REPLACE INTO player_stats
                    (player, team, pos1, pos2, price, diff, projection, injured, bye_grade, round)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    player,
                    field(team_col),
                    field(pos1_col),
                    pos2,
                    price,
                    diff,
                    projection,
                    injured,
                    bye_grade,
                    round,
                ],
            )
            .with_context(|| format!("failed to insert row {line}"))?;
            imported += 1;
        }

        tx.commit().context("failed to commit import")?;
        info!(imported, path = %path.display(), "imported season data");
        Ok(imported)
    }

    /// Load the full snapshot: every player-round row, ordered by round.
    /// Rows with an unrecognized primary position are skipped with a
    /// warning rather than failing the whole load.
    pub fn load_snapshot(&self) -> Result<Dataset> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player, team, pos1, pos2, price, diff, projection, injured, bye_grade, round
                 FROM player_stats ORDER BY round, player",
            )
            .context("failed to prepare snapshot query")?;

        let mut rows_iter = stmt
            .query(params![])
            .context("failed to query player stats")?;

        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next().context("failed to read player stats row")? {
            let name: String = row.get(0)?;
            let pos1: String = row.get(2)?;
            let Some(position) = Position::from_code(&pos1) else {
                warn!(player = %name, position = %pos1, "skipping row with unknown position");
                continue;
            };
            let pos2: Option<String> = row.get(3)?;
            let bye_grade: Option<i64> = row.get(8)?;

            rows.push(PlayerRecord {
                name,
                team: row.get(1)?,
                position,
                secondary_position: pos2.as_deref().and_then(Position::from_code),
                price: row.get(4)?,
                diff: row.get(5)?,
                projection: row.get(6)?,
                injured: row.get(7)?,
                bye_grade: bye_grade.and_then(|g| u8::try_from(g).ok()),
                round: row.get::<_, i64>(9)? as u32,
            });
        }

        Ok(Dataset::new(rows))
    }

    /// Number of player-round rows currently stored.
    pub fn row_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM player_stats", [], |row| row.get(0))
            .context("failed to count player stats")?;
        Ok(count as usize)
    }

    /// Delete all stored player statistics.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM player_stats", [])
            .context("failed to clear player stats")?;
        Ok(())
    }
}

/// Prices arrive as plain integers or currency-formatted strings
/// ("$650,000"); both parse to the same value.
fn parse_price(raw: &str) -> Result<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned
        .parse()
        .with_context(|| format!("unparseable price `{raw}`"))
}

/// Injured flags come in several spellings; anything not recognized as
/// true-ish is healthy.
fn parse_injured(raw: &str) -> bool {
    matches!(
        raw.to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t" | "injured"
    )
}
