//! Persisted user configuration.
//!
//! Stored as TOML at `~/.config/arbor/config.toml` (platform equivalent via
//! `dirs`). Two settings:
//!
//! - `base-dir` - the folder scanned for repositories and worktrees
//! - `editor` - preferred editor command (empty/absent means auto-detect)
//!
//! Environment variables `ARBOR_DEV_DIR` and `ARBOR_EDITOR` override the file
//! values. Overrides are applied exactly once, in [`Config::load`]; the rest
//! of the program receives the resolved value by parameter and never consults
//! the environment or the file itself.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `base-dir`.
pub const DEV_DIR_ENV: &str = "ARBOR_DEV_DIR";

/// Environment variable overriding `editor`.
pub const EDITOR_ENV: &str = "ARBOR_EDITOR";

/// Where a resolved setting came from, for display in the settings flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    EnvVar,
    ConfigFile,
    Unset,
}

impl SettingSource {
    pub fn describe(self, env_var: &str) -> String {
        match self {
            SettingSource::EnvVar => format!("{env_var} env var"),
            SettingSource::ConfigFile => "config file".to_string(),
            SettingSource::Unset => "not set".to_string(),
        }
    }
}

/// Resolved application settings, constructed once at process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Folder where repositories live. Tilde-expanded on access.
    #[serde(default, rename = "base-dir", skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,

    /// Preferred editor command. `None` means auto-detect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    #[serde(skip)]
    pub base_dir_source: Option<SettingSource>,

    #[serde(skip)]
    pub editor_source: Option<SettingSource>,

    /// Where this config was loaded from and where `save` writes back.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

/// Path of the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arbor")
        .join("config.toml")
}

impl Config {
    /// Load the config file and apply environment overrides.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::load_file(&config_path())?;
        Ok(config.with_env_overrides(
            std::env::var(DEV_DIR_ENV).ok().filter(|v| !v.is_empty()),
            std::env::var(EDITOR_ENV).ok().filter(|v| !v.is_empty()),
        ))
    }

    /// Load from a specific file, without environment overrides.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    ..Self::default()
                });
            }
            Err(e) => {
                return Err(e).context(format!("Failed to read config: {}", path.display()));
            }
        };
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.base_dir_source = Some(match config.base_dir {
            Some(_) => SettingSource::ConfigFile,
            None => SettingSource::Unset,
        });
        config.editor_source = Some(match config.editor {
            Some(_) => SettingSource::ConfigFile,
            None => SettingSource::Unset,
        });
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply environment overrides on top of file values.
    pub fn with_env_overrides(mut self, dev_dir: Option<String>, editor: Option<String>) -> Self {
        if let Some(dir) = dev_dir {
            self.base_dir = Some(dir);
            self.base_dir_source = Some(SettingSource::EnvVar);
        }
        if let Some(editor) = editor {
            self.editor = Some(editor);
            self.editor_source = Some(SettingSource::EnvVar);
        }
        self
    }

    /// Write the persistent fields back to where they were loaded from.
    pub fn save(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => self.save_to(&config_path()),
        }
    }

    /// Write the persistent fields to a specific path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// The scan root with `~` expanded, or `None` when unconfigured.
    pub fn dev_dir(&self) -> Option<PathBuf> {
        self.base_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned()))
    }

    /// The configured editor command, or `None` for auto-detect.
    pub fn editor(&self) -> Option<&str> {
        self.editor.as_deref().filter(|e| !e.is_empty())
    }

    pub fn base_dir_source(&self) -> SettingSource {
        self.base_dir_source.unwrap_or(SettingSource::Unset)
    }

    pub fn editor_source(&self) -> SettingSource {
        self.editor_source.unwrap_or(SettingSource::Unset)
    }
}
