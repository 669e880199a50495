//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::NaiveDate;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rac_core::TrainKey;
use serde::{Deserialize, Serialize};

use crate::cli::TrainArgs;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Train used when a command omits `--train`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_no: Option<String>,

    /// Journey date used when a command omits `--date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_date: Option<NaiveDate>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("train_no", &self.train_no)
            .field("journey_date", &self.journey_date)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("rac.db"),
            train_no: None,
            journey_date: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (RAC_*)
        figment = figment.merge(Env::prefixed("RAC_"));

        figment.extract()
    }

    /// Resolves the train run from command arguments, falling back to config.
    pub fn train_key(&self, args: &TrainArgs) -> Result<TrainKey> {
        let Some(train_no) = args.train.clone().or_else(|| self.train_no.clone()) else {
            bail!("no train given: pass --train or set train_no in the config file");
        };
        let Some(journey_date) = args.date.or(self.journey_date) else {
            bail!("no journey date given: pass --date or set journey_date in the config file");
        };
        Ok(TrainKey::new(train_no, journey_date))
    }
}

/// Returns the platform-specific config directory for rac.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("rac"))
}

/// Returns the platform-specific data directory for rac.
///
/// On Linux: `~/.local/share/rac`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("rac"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_rac() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "rac");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("rac.db"));
        assert!(config.train_no.is_none());
    }

    #[test]
    fn test_config_file_sets_default_train() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_path = \"/tmp/rac-test.db\"\ntrain_no = \"12951\"\njourney_date = \"2025-01-15\""
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/rac-test.db"));

        let key = config.train_key(&TrainArgs::default()).unwrap();
        assert_eq!(key.train_no, "12951");

        let overridden = config
            .train_key(&TrainArgs {
                train: Some("12952".to_string()),
                date: None,
            })
            .unwrap();
        assert_eq!(overridden.train_no, "12952");
        assert_eq!(overridden.journey_date, key.journey_date);
    }

    #[test]
    fn test_train_key_requires_train_and_date() {
        let config = Config {
            database_path: PathBuf::from("rac.db"),
            train_no: None,
            journey_date: None,
        };
        let err = config.train_key(&TrainArgs::default()).unwrap_err();
        assert!(err.to_string().contains("--train"));
    }
}
