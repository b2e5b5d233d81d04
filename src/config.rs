// Configuration loading and parsing (season.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::trade::lockout::Fixture;
use crate::trade::recommend::TradeOutThresholds;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// season.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire season.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SeasonFile {
    season: SeasonSection,
    database: DatabaseSection,
    cache: CacheSection,
    #[serde(default)]
    thresholds: ThresholdsSection,
    #[serde(default)]
    fixtures: Vec<FixtureEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    name: String,
    /// Offset of the competition timezone from UTC, in hours.
    utc_offset_hours: i32,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CacheSection {
    ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct ThresholdsSection {
    junk_price: i64,
    junk_upside: f64,
    overvalued_diff: f64,
}

impl Default for ThresholdsSection {
    fn default() -> Self {
        let t = TradeOutThresholds::default();
        Self {
            junk_price: t.junk_price,
            junk_upside: t.junk_upside,
            overvalued_diff: t.overvalued_diff,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureEntry {
    kickoff: String,
    teams: Vec<String>,
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season_name: String,
    pub utc_offset_hours: i32,
    pub db_path: String,
    pub cache_ttl_seconds: u64,
    pub thresholds: TradeOutThresholds,
    /// Fixtures in kickoff order, as listed in season.toml.
    pub fixtures: Vec<Fixture>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/season.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let season_path = base_dir.join("config").join("season.toml");
    let season_text = read_file(&season_path)?;
    let season_file: SeasonFile =
        toml::from_str(&season_text).map_err(|e| ConfigError::ParseError {
            path: season_path.clone(),
            source: e,
        })?;

    let mut fixtures = Vec::with_capacity(season_file.fixtures.len());
    for entry in &season_file.fixtures {
        let fixture =
            Fixture::parse(&entry.kickoff, entry.teams.clone()).map_err(|e| {
                ConfigError::ValidationError {
                    field: "fixtures.kickoff".into(),
                    message: format!("unparseable kickoff `{}`: {e}", entry.kickoff),
                }
            })?;
        fixtures.push(fixture);
    }

    let config = Config {
        season_name: season_file.season.name,
        utc_offset_hours: season_file.season.utc_offset_hours,
        db_path: season_file.database.path,
        cache_ttl_seconds: season_file.cache.ttl_seconds,
        thresholds: TradeOutThresholds {
            junk_price: season_file.thresholds.junk_price,
            junk_upside: season_file.thresholds.junk_upside,
            overvalued_diff: season_file.thresholds.overvalued_diff,
        },
        fixtures,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.cache_ttl_seconds == 0 {
        return Err(ConfigError::ValidationError {
            field: "cache.ttl_seconds".into(),
            message: "must be greater than 0".into(),
        });
    }

    if !(-12..=14).contains(&config.utc_offset_hours) {
        return Err(ConfigError::ValidationError {
            field: "season.utc_offset_hours".into(),
            message: format!("must be a real UTC offset, got {}", config.utc_offset_hours),
        });
    }

    if config.thresholds.junk_price <= 0 {
        return Err(ConfigError::ValidationError {
            field: "thresholds.junk_price".into(),
            message: "must be greater than 0".into(),
        });
    }

    for fixture in &config.fixtures {
        if fixture.teams.len() != 2 {
            return Err(ConfigError::ValidationError {
                field: "fixtures.teams".into(),
                message: format!("each fixture needs exactly 2 teams, got {:?}", fixture.teams),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the path to the project root (works whether
    /// `cargo test` runs from the crate root or repo root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("trade-assistant/defaults").exists() {
            cwd.join("trade-assistant")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let root = project_root();
        ensure_config_files(&root).expect("should copy default configs");
        let config = load_config_from(&root).expect("should load valid config");

        assert_eq!(config.season_name, "NRL Fantasy 2025");
        assert_eq!(config.utc_offset_hours, 11);
        assert_eq!(config.db_path, "trade-assistant.db");
        assert_eq!(config.cache_ttl_seconds, 300);
        assert_eq!(config.thresholds.junk_price, 350_000);
        assert!((config.thresholds.junk_upside - 5.0).abs() < f64::EPSILON);
        assert!((config.thresholds.overvalued_diff - -2.0).abs() < f64::EPSILON);

        assert_eq!(config.fixtures.len(), 8);
        assert_eq!(config.fixtures[0].teams, vec!["MEL", "BRI"]);
        assert_eq!(config.fixtures[7].teams, vec!["PAR", "NQL"]);
    }

    #[test]
    fn missing_thresholds_section_uses_defaults() {
        let tmp = std::env::temp_dir().join("season_test_no_thresholds");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(
            config_dir.join("season.toml"),
            r#"
[season]
name = "Test Season"
utc_offset_hours = 11

[database]
path = "test.db"

[cache]
ttl_seconds = 60
"#,
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load without thresholds");
        assert_eq!(config.thresholds.junk_price, 350_000);
        assert!(config.fixtures.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_ttl() {
        let tmp = std::env::temp_dir().join("season_test_zero_ttl");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(
            config_dir.join("season.toml"),
            r#"
[season]
name = "Test Season"
utc_offset_hours = 11

[database]
path = "test.db"

[cache]
ttl_seconds = 0
"#,
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "cache.ttl_seconds");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unreal_utc_offset() {
        let tmp = std::env::temp_dir().join("season_test_bad_offset");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(
            config_dir.join("season.toml"),
            r#"
[season]
name = "Test Season"
utc_offset_hours = 40

[database]
path = "test.db"

[cache]
ttl_seconds = 60
"#,
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "season.utc_offset_hours");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_malformed_fixture_kickoff() {
        let tmp = std::env::temp_dir().join("season_test_bad_kickoff");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(
            config_dir.join("season.toml"),
            r#"
[season]
name = "Test Season"
utc_offset_hours = 11

[database]
path = "test.db"

[cache]
ttl_seconds = 60

[[fixtures]]
kickoff = "next thursday"
teams = ["MEL", "BRI"]
"#,
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "fixtures.kickoff");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_fixture_without_two_teams() {
        let tmp = std::env::temp_dir().join("season_test_one_team");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(
            config_dir.join("season.toml"),
            r#"
[season]
name = "Test Season"
utc_offset_hours = 11

[database]
path = "test.db"

[cache]
ttl_seconds = 60

[[fixtures]]
kickoff = "2025-08-07 19:50"
teams = ["MEL"]
"#,
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "fixtures.teams");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_season_toml() {
        let tmp = std::env::temp_dir().join("season_test_missing_file");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("season.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = std::env::temp_dir().join("season_test_invalid_toml");
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(config_dir.join("season.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with("season.toml"));
            }
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("season_test_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/season.toml"), defaults_dir.join("season.toml")).unwrap();
        // Add an example file that should NOT be copied
        fs::write(defaults_dir.join("season.toml.example"), "# example\n").unwrap();

        assert!(!tmp.join("config").exists());

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);

        assert!(tmp.join("config/season.toml").exists());
        assert!(!tmp.join("config/season.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("season_test_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);

        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/season.toml"), defaults_dir.join("season.toml")).unwrap();

        // Pre-create season.toml in config/ with custom content
        fs::write(config_dir.join("season.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());

        let content = fs::read_to_string(config_dir.join("season.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("season_test_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
