//! Game rules and configuration file handling

use crate::game::dictionary::{DictionaryKind, DEFAULT_DICTIONARY_URL};
use crate::game::scoring::ScoringKind;
use crate::game::validation::MIN_WORD_LENGTH;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid rules: {0}")]
    InvalidRules(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Tunable gameplay constants for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rules {
    pub min_word_length: usize,
    /// Seconds on the clock at start
    pub starting_time: u32,
    pub initial_letters: usize,
    /// Letters appended at each level milestone
    pub level_up_letters: usize,
    /// Accepted-word counts that trigger a level up
    pub level_milestones: Vec<usize>,
    /// Accepted-word count that wins the game
    pub win_threshold: usize,
    /// Ticks the level-up banner stays visible
    pub level_up_display_ticks: u32,
    /// Ticks the time-bonus echo stays visible
    pub time_bonus_display_ticks: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            min_word_length: MIN_WORD_LENGTH,
            starting_time: 30,
            initial_letters: 10,
            level_up_letters: 5,
            level_milestones: vec![3, 6],
            win_threshold: 10,
            level_up_display_ticks: 2,
            time_bonus_display_ticks: 1,
        }
    }
}

impl Rules {
    /// Reject rule sets that cannot produce a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_word_length == 0 {
            return Err(ConfigError::InvalidRules(
                "min_word_length must be at least 1".to_string(),
            ));
        }
        if self.starting_time == 0 {
            return Err(ConfigError::InvalidRules(
                "starting_time must be positive".to_string(),
            ));
        }
        if self.initial_letters == 0 {
            return Err(ConfigError::InvalidRules(
                "initial_letters must be positive".to_string(),
            ));
        }
        if self.win_threshold == 0 {
            return Err(ConfigError::InvalidRules(
                "win_threshold must be positive".to_string(),
            ));
        }
        if self.level_milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidRules(
                "level_milestones must be strictly increasing".to_string(),
            ));
        }
        if let Some(&last) = self.level_milestones.last() {
            if last >= self.win_threshold {
                return Err(ConfigError::InvalidRules(format!(
                    "level milestone {} is not below win_threshold {}",
                    last, self.win_threshold
                )));
            }
        }
        if self.level_milestones.first() == Some(&0) {
            return Err(ConfigError::InvalidRules(
                "level milestones start at 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `count` accepted words is a level milestone
    pub fn is_milestone(&self, count: usize) -> bool {
        self.level_milestones.contains(&count)
    }
}

/// Everything loaded from the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub rules: Rules,
    pub scoring: ScoringKind,
    pub dictionary: DictionaryKind,
    pub dictionary_url: String,
    /// Per-lookup timeout; must be positive
    pub lookup_timeout_ms: u64,
}

impl Config {
    /// Reject settings that would make every lookup fail or the game unplayable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting(
                "lookup_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            scoring: ScoringKind::default(),
            dictionary: DictionaryKind::default(),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            lookup_timeout_ms: 5_000,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Result<Config, ConfigError>;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "wordrush") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wordrush_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing file yields defaults; a present but broken file is an error.
    fn load(&self) -> Result<Config, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let cfg: Config = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = Rules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.min_word_length, 2);
        assert_eq!(rules.starting_time, 30);
        assert_eq!(rules.level_milestones, vec![3, 6]);
        assert_eq!(rules.win_threshold, 10);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn test_save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            rules: Rules {
                min_word_length: 3,
                level_milestones: vec![3, 6, 9],
                win_threshold: 13,
                ..Rules::default()
            },
            scoring: ScoringKind::Classic,
            dictionary: DictionaryKind::Common,
            dictionary_url: "http://localhost:8080/entries".into(),
            lookup_timeout_ms: 250,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"dictionary": "offline", "rules": {"win_threshold": 12}}"#,
        )
        .unwrap();

        let cfg = FileConfigStore::with_path(&path).load().unwrap();
        assert_eq!(cfg.dictionary, DictionaryKind::Offline);
        assert_eq!(cfg.rules.win_threshold, 12);
        assert_eq!(cfg.rules.starting_time, 30);
        assert_eq!(cfg.scoring, ScoringKind::Fibonacci);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileConfigStore::with_path(&path).load(),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_inconsistent_rules_are_rejected() {
        let bad = [
            Rules {
                level_milestones: vec![6, 3],
                ..Rules::default()
            },
            Rules {
                level_milestones: vec![3, 10],
                ..Rules::default()
            },
            Rules {
                starting_time: 0,
                ..Rules::default()
            },
            Rules {
                min_word_length: 0,
                ..Rules::default()
            },
            Rules {
                win_threshold: 0,
                level_milestones: vec![],
                ..Rules::default()
            },
        ];
        for rules in bad {
            assert!(rules.validate().is_err(), "{:?} should be invalid", rules);
        }
    }

    #[test]
    fn test_zero_lookup_timeout_is_rejected() {
        let cfg = Config {
            lookup_timeout_ms: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSetting(_))));

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"lookup_timeout_ms": 0}"#).unwrap();
        assert!(matches!(
            FileConfigStore::with_path(&path).load(),
            Err(ConfigError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_milestones() {
        let rules = Rules::default();
        assert!(rules.is_milestone(3));
        assert!(rules.is_milestone(6));
        assert!(!rules.is_milestone(9));
    }
}
