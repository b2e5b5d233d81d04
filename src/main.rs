// Trade assistant entry point.
//
// Subcommands:
// - `import`: load a season data export (CSV) into the SQLite store
// - `trades`: trade-in combinations for a chosen set of trade-outs
// - `recommend`: combined trade-out selection plus trade-in search
// - `preseason`: flat preseason trade-in candidate list
//
// All results print as JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use trade_assistant::cache::SnapshotCache;
use trade_assistant::config::{self, Config};
use trade_assistant::db::Database;
use trade_assistant::model::{Position, Strategy, TradeOutRequest};
use trade_assistant::trade::lockout::normalize_reference_time;
use trade_assistant::trade::recommend::{
    calculate_trade_options, preseason_trade_in_candidates, recommend_trades, PreseasonParams,
    RecommendParams, TeamPlayer, TradeOptions,
};

#[derive(Parser)]
#[command(
    name = "tradecalc",
    about = "Fantasy trade calculator: price-bracket and projection based trade recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a season data export (CSV) into the database.
    Import {
        /// Path to the CSV export.
        path: PathBuf,
    },
    /// Calculate trade-in combinations for the given trade-outs.
    Trades {
        /// Player(s) to trade out. Abbreviated names ("E. Clark") accepted.
        #[arg(long = "trade-out", required = true)]
        trade_out: Vec<String>,

        /// Strategy: value (1), base (2), or hybrid (3).
        #[arg(long, default_value = "value")]
        strategy: String,

        /// Cash in bank, added to the freed salary.
        #[arg(long, default_value_t = 0)]
        cash: i64,

        /// Restrict trade-in candidates to these positions (HOK/MID/EDG/HLF/CTR/WFB).
        #[arg(long = "position")]
        positions: Vec<String>,

        /// Players to exclude from the candidate pool.
        #[arg(long = "exclude")]
        excluded: Vec<String>,

        /// Apply fixture lockout as of this local time (ISO, e.g. 2025-08-07T19:00).
        #[arg(long)]
        now: Option<String>,

        /// Local UTC offset in minutes (JavaScript getTimezoneOffset convention).
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        tz_offset: i32,

        /// Weight candidates by bye-round coverage.
        #[arg(long, default_value_t = false)]
        target_bye: bool,

        /// Maximum combinations to return.
        #[arg(long, default_value_t = 10)]
        max_options: usize,
    },
    /// Recommend who to trade out and what to bring in for a squad.
    Recommend {
        /// Path to a JSON file with the squad: [{"name", "positions", "price"}, ...].
        #[arg(long)]
        team: PathBuf,

        /// Number of trades to recommend.
        #[arg(long, default_value_t = 2)]
        num_trades: usize,

        /// Strategy: value (1), base (2), or hybrid (3).
        #[arg(long, default_value = "value")]
        strategy: String,

        /// Cash in bank.
        #[arg(long, default_value_t = 0)]
        cash: i64,

        /// Players to exclude from the candidate pool.
        #[arg(long = "exclude")]
        excluded: Vec<String>,

        /// Weight selection by bye-round coverage.
        #[arg(long, default_value_t = false)]
        target_bye: bool,

        /// Preseason mode: only injured, overvalued, or unselected players
        /// are trade-out candidates.
        #[arg(long, default_value_t = false)]
        preseason: bool,
    },
    /// List individual preseason trade-in candidates.
    Preseason {
        /// Maximum price per candidate.
        #[arg(long, default_value_t = 1_000_000)]
        salary_cap: i64,

        /// Strategy: value (1), base (2), or hybrid (3).
        #[arg(long, default_value = "value")]
        strategy: String,

        /// Restrict candidates to these positions.
        #[arg(long = "position")]
        positions: Vec<String>,

        /// Players to exclude.
        #[arg(long = "exclude")]
        excluded: Vec<String>,

        /// Weight candidates by bye-round coverage.
        #[arg(long, default_value_t = false)]
        target_bye: bool,

        /// Maximum candidates to return.
        #[arg(long, default_value_t = 50)]
        max_results: usize,

        /// Filter by cascading price bands around these trade-outs instead
        /// of the salary cap.
        #[arg(long = "band-around")]
        band_around: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = config::load_config().context("failed to load configuration")?;
    info!(season = %config.season_name, "configuration loaded");

    let db = Database::open(&config.db_path).context("failed to open database")?;

    match cli.command {
        Commands::Import { path } => {
            let imported = db.import_csv(&path)?;
            println!("{}", serde_json::json!({ "imported_rows": imported }));
        }
        Commands::Trades {
            trade_out,
            strategy,
            cash,
            positions,
            excluded,
            now,
            tz_offset,
            target_bye,
            max_options,
        } => {
            let strategy = parse_strategy(&strategy)?;
            let allowed_positions = parse_positions(&positions)?;
            let dataset = load_dataset(&config, db)?;

            let reference_time = now
                .as_deref()
                .and_then(|n| normalize_reference_time(n, tz_offset, config.utc_offset_hours));
            if now.is_some() && reference_time.is_none() {
                bail!("could not parse --now as a local ISO timestamp");
            }

            let requests: Vec<TradeOutRequest> = trade_out
                .iter()
                .map(|name| TradeOutRequest::by_name(name.clone()))
                .collect();
            let options = TradeOptions {
                strategy,
                max_options,
                allowed_positions,
                team_restriction: None,
                apply_lockout: reference_time.is_some(),
                reference_time,
                excluded_players: excluded,
                cash_in_bank: cash,
                target_bye_round: target_bye,
                fixtures: &config.fixtures,
            };

            let combos = calculate_trade_options(&dataset, &requests, &options)?;
            println!("{}", serde_json::to_string_pretty(&combos)?);
        }
        Commands::Recommend {
            team,
            num_trades,
            strategy,
            cash,
            excluded,
            target_bye,
            preseason,
        } => {
            let strategy = parse_strategy(&strategy)?;
            let team_text = std::fs::read_to_string(&team)
                .with_context(|| format!("failed to read team file {}", team.display()))?;
            let team_players: Vec<TeamPlayer> =
                serde_json::from_str(&team_text).context("failed to parse team file")?;
            let dataset = load_dataset(&config, db)?;

            let params = RecommendParams {
                strategy,
                num_trades,
                cash_in_bank: cash,
                allowed_positions: None,
                reference_time: None,
                apply_lockout: false,
                excluded_players: excluded,
                target_bye_round: target_bye,
                preseason_mode: preseason,
                preselected_trade_outs: None,
                thresholds: config.thresholds,
                fixtures: &config.fixtures,
            };

            let recommendation = recommend_trades(&team_players, &dataset, &params)?;
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
        }
        Commands::Preseason {
            salary_cap,
            strategy,
            positions,
            excluded,
            target_bye,
            max_results,
            band_around,
        } => {
            let strategy = parse_strategy(&strategy)?;
            let allowed_positions = parse_positions(&positions)?.unwrap_or_default();
            let dataset = load_dataset(&config, db)?;

            let params = PreseasonParams {
                salary_cap,
                strategy,
                allowed_positions,
                excluded_players: excluded,
                target_bye_round: target_bye,
                max_results,
                price_bands: !band_around.is_empty(),
                trade_outs: band_around
                    .iter()
                    .map(|name| TradeOutRequest::by_name(name.clone()))
                    .collect(),
            };

            let candidates = preseason_trade_in_candidates(&dataset, &params);
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
    }

    Ok(())
}

/// Load the snapshot through the TTL cache. One-shot CLI runs always load
/// fresh, but imports and long-lived callers share this path.
fn load_dataset(
    config: &Config,
    db: Database,
) -> Result<std::sync::Arc<trade_assistant::model::Dataset>> {
    let cache = SnapshotCache::new(db, Duration::from_secs(config.cache_ttl_seconds));
    let (dataset, _freshness) = cache.get_snapshot()?;
    if dataset.is_empty() {
        bail!("no player data imported yet; run `tradecalc import <csv>` first");
    }
    Ok(dataset)
}

fn parse_strategy(raw: &str) -> Result<Strategy> {
    Strategy::from_code(raw)
        .with_context(|| format!("unknown strategy `{raw}` (expected value, base, or hybrid)"))
}

fn parse_positions(raw: &[String]) -> Result<Option<Vec<Position>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let mut positions = Vec::with_capacity(raw.len());
    for code in raw {
        let position = Position::from_code(code)
            .with_context(|| format!("unknown position code `{code}`"))?;
        positions.push(position);
    }
    Ok(Some(positions))
}

/// Initialize tracing to stderr so stdout stays clean for JSON output.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trade_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
