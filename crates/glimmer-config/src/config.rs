//! The `config.toml` file.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Application settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target time between frames.
    pub frame_interval_ms: u64,
    pub sparkles: usize,
    pub particles: usize,
    pub constellation_points: usize,
    pub stars: usize,
    pub dust: usize,
    pub shooting_stars: bool,
    /// Depths of the decorative parallax layers, nearest last.
    pub parallax_depths: Vec<f64>,
    pub tilt_divisor: f64,
    pub card_tilt_divisor: f64,
    /// How often the system colour scheme is re-checked.
    pub appearance_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            sparkles: 50,
            particles: 50,
            constellation_points: 20,
            stars: 50,
            dust: 100,
            shooting_stars: true,
            parallax_depths: vec![0.02, 0.05, 0.1],
            tilt_divisor: 30.0,
            card_tilt_divisor: 20.0,
            appearance_poll_ms: 2000,
        }
    }
}

/// Per-user directories glimmer reads and writes.
pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "glimmer").ok_or(ConfigError::NoProjectDirs)
}

impl Config {
    /// Default location: `<config dir>/glimmer/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = scratch_dir("config-missing");
        let config = Config::load_from(&dir.join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = scratch_dir("config-partial");
        let path = dir.join("config.toml");
        fs::write(&path, "sparkles = 12\nshooting_stars = false\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sparkles, 12);
        assert!(!config.shooting_stars);
        assert_eq!(config.stars, 50);
        assert_eq!(config.parallax_depths, vec![0.02, 0.05, 0.1]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = scratch_dir("config-bad");
        let path = dir.join("config.toml");
        fs::write(&path, "sparkles = \"many\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("config-save");
        let path = dir.join("nested").join("config.toml");
        let config = Config {
            dust: 7,
            tilt_divisor: 45.0,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
