// Configuration loading and parsing (settings.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::roster::Sport;
use crate::sim::thresholds::ContestType;

// ---------------------------------------------------------------------------
// Error type
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
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    optimizer: OptimizerSettings,
    #[serde(default)]
    simulation: SimulationSettings,
}

/// Rule set for one optimization batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// How many distinct lineups to produce.
    pub max_lineups: usize,
    /// Soft cap on the fraction of lineups any one player may appear in.
    pub max_exposure: f64,
    /// Lower bound on total lineup salary. 0 disables the floor.
    pub min_salary: u32,
    /// Upper bound on total lineup salary. 0 means "use the site cap".
    pub max_salary: u32,
    pub sport: Sport,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            max_lineups: 20,
            max_exposure: 0.6,
            min_salary: 0,
            max_salary: 0,
            sport: Sport::Nfl,
        }
    }
}

/// Controls for one Monte Carlo run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of Monte Carlo trials. Must be at least 1.
    pub trials: u32,
    /// Whether team/stack correlation adjustments are applied.
    pub include_correlation: bool,
    pub sport: Sport,
    pub contest_type: ContestType,
    /// Fixed RNG seed for reproducible runs. None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            trials: 1000,
            include_correlation: true,
            sport: Sport::Nfl,
            contest_type: ContestType::Gpp,
            seed: None,
        }
    }
}

/// The assembled settings for one slate run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub optimizer: OptimizerSettings,
    pub simulation: SimulationSettings,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let file: SettingsFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let settings = Settings {
        optimizer: file.optimizer,
        simulation: file.simulation,
    };
    validate(&settings)?;
    Ok(settings)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let opt = &settings.optimizer;
    if opt.max_lineups == 0 {
        return Err(ConfigError::ValidationError {
            field: "optimizer.max_lineups".into(),
            message: "must be at least 1".into(),
        });
    }
    if !(0.0..=1.0).contains(&opt.max_exposure) {
        return Err(ConfigError::ValidationError {
            field: "optimizer.max_exposure".into(),
            message: format!(
                "must be between 0.0 and 1.0 inclusive, got {}",
                opt.max_exposure
            ),
        });
    }
    if opt.max_salary != 0 && opt.min_salary > opt.max_salary {
        return Err(ConfigError::ValidationError {
            field: "optimizer.min_salary".into(),
            message: format!(
                "min_salary {} exceeds max_salary {}",
                opt.min_salary, opt.max_salary
            ),
        });
    }

    let sim = &settings.simulation;
    if sim.trials == 0 {
        return Err(ConfigError::ValidationError {
            field: "simulation.trials".into(),
            message: "must be at least 1".into(),
        });
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

    fn write_settings(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_full_settings_file() {
        let path = write_settings(
            "slatecraft_settings_full.toml",
            r#"
[optimizer]
max_lineups = 5
max_exposure = 0.4
min_salary = 45000
max_salary = 50000
sport = "nfl"

[simulation]
trials = 2500
include_correlation = false
sport = "nfl"
contest_type = "cash"
seed = 42
"#,
        );

        let settings = load_settings(&path).expect("should load");
        assert_eq!(settings.optimizer.max_lineups, 5);
        assert!((settings.optimizer.max_exposure - 0.4).abs() < f64::EPSILON);
        assert_eq!(settings.optimizer.min_salary, 45_000);
        assert_eq!(settings.optimizer.sport, Sport::Nfl);
        assert_eq!(settings.simulation.trials, 2500);
        assert!(!settings.simulation.include_correlation);
        assert_eq!(settings.simulation.contest_type, ContestType::Cash);
        assert_eq!(settings.simulation.seed, Some(42));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let path = write_settings("slatecraft_settings_empty.toml", "");
        let settings = load_settings(&path).expect("should load with defaults");
        assert_eq!(settings.optimizer.max_lineups, 20);
        assert_eq!(settings.simulation.trials, 1000);
        assert!(settings.simulation.include_correlation);
        assert!(settings.simulation.seed.is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_zero_max_lineups() {
        let path = write_settings(
            "slatecraft_settings_zero_lineups.toml",
            "[optimizer]\nmax_lineups = 0\n",
        );
        let err = load_settings(&path).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "optimizer.max_lineups");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_exposure_above_one() {
        let path = write_settings(
            "slatecraft_settings_high_exposure.toml",
            "[optimizer]\nmax_exposure = 1.5\n",
        );
        let err = load_settings(&path).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "optimizer.max_exposure");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_inverted_salary_bounds() {
        let path = write_settings(
            "slatecraft_settings_inverted.toml",
            "[optimizer]\nmin_salary = 50000\nmax_salary = 45000\n",
        );
        let err = load_settings(&path).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "optimizer.min_salary");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_zero_trials() {
        let path = write_settings(
            "slatecraft_settings_zero_trials.toml",
            "[simulation]\ntrials = 0\n",
        );
        let err = load_settings(&path).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "simulation.trials");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_not_found() {
        let err = load_settings(Path::new("/nonexistent/settings.toml")).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("settings.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let path = write_settings("slatecraft_settings_bad.toml", "this is not [[[ toml");
        let err = load_settings(&path).unwrap_err();
        match &err {
            ConfigError::ParseError { .. } => {}
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_file(&path);
    }
}
