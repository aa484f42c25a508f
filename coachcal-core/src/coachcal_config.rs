//! Global coachcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CoachCalError, CoachCalResult};
use crate::planner::Planner;
use crate::store::FileStore;

static DEFAULT_DATA_DIR: &str = "~/coachcal";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

/// Configuration at ~/.config/coachcal/config.toml, overridable with
/// `COACHCAL_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CoachcalConfig {
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA zone used as the calendar frame. Host zone when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Subject whose calendar is shown by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for CoachcalConfig {
    fn default() -> Self {
        CoachcalConfig {
            data_dir: default_data_dir(),
            timezone: None,
            user: None,
        }
    }
}

impl CoachcalConfig {
    pub fn config_path() -> CoachCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoachCalError::Config("Could not determine config directory".into()))?
            .join("coachcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default file first if none exists.
    pub fn load() -> CoachCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CoachCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("COACHCAL"))
            .build()
            .map_err(|e| CoachCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoachCalError::Config(e.to_string()))
    }

    /// Save the current config to ~/.config/coachcal/config.toml
    pub fn save(&self) -> CoachCalResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> CoachCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CoachCalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoachCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| CoachCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CoachCalResult<()> {
        let contents = format!(
            "\
# coachcal configuration

# Where tasks and todos are stored:
# data_dir = \"{}\"

# Calendar time zone (defaults to the system zone):
# timezone = \"Europe/Berlin\"

# Whose calendar to show by default (defaults to $USER):
# user = \"coach\"
",
            DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoachCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CoachCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// The calendar frame. An invalid configured zone is an error; a host
    /// zone chrono-tz doesn't know falls back to UTC.
    pub fn tz(&self) -> CoachCalResult<Tz> {
        if let Some(name) = &self.timezone {
            return name
                .parse::<Tz>()
                .map_err(|_| CoachCalError::Config(format!("Unknown time zone '{name}'")));
        }

        match iana_time_zone::get_timezone() {
            Ok(name) => Ok(name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(zone = %name, "unknown system time zone, using UTC");
                Tz::UTC
            })),
            Err(e) => {
                tracing::warn!(error = %e, "could not detect system time zone, using UTC");
                Ok(Tz::UTC)
            }
        }
    }

    pub fn user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "me".to_string())
    }

    /// A planner over the file store in the data directory.
    pub fn planner(&self) -> CoachCalResult<Planner<FileStore>> {
        let store = FileStore::open(self.data_path())?;
        Ok(Planner::new(store, self.tz()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coachcal").join("config.toml");

        CoachcalConfig::create_default_config(&path).unwrap();
        let config = CoachcalConfig::load_from(&path).unwrap();

        assert_eq!(config.data_dir, default_data_dir());
        assert!(config.timezone.is_none());
    }

    #[test]
    fn test_explicit_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/coachcal\"\ntimezone = \"Europe/Berlin\"\nuser = \"coach\"\n",
        )
        .unwrap();

        let config = CoachcalConfig::load_from(&path).unwrap();

        assert_eq!(config.data_path(), PathBuf::from("/srv/coachcal"));
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(config.user(), "coach");
    }

    #[test]
    fn test_unknown_zone_is_config_error() {
        let config = CoachcalConfig {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.tz(), Err(CoachCalError::Config(_))));
    }

    #[test]
    fn test_default_dir_is_not_serialized() {
        let config = CoachcalConfig {
            user: Some("coach".to_string()),
            ..Default::default()
        };
        let toml = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml.trim(), "user = \"coach\"");
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coachcal").join("config.toml");
        let config = CoachcalConfig {
            data_dir: PathBuf::from("/srv/coachcal"),
            timezone: Some("America/New_York".to_string()),
            user: Some("athlete".to_string()),
        };

        config.save_to(&path).unwrap();

        assert_eq!(CoachcalConfig::load_from(&path).unwrap(), config);
    }
}
