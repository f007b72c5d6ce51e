//! Settings file: index layout, match settings and template parameters.
//!
//! Stored in ~/.fingerhash/config.yaml unless `--config` names another
//! file. Every field is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use fingerhash_index::{DatabaseConfig, MatchConfig};
use serde::{Deserialize, Serialize};

/// Default base directory name, under the home directory.
pub const DEFAULT_BASE_DIR: &str = ".fingerhash";
/// Default settings filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub matching: MatchConfig,
    pub template: TemplateSettings,
}

/// How templates are built from `.xyt` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Records read per file (default: 64).
    pub max_minutiae: usize,
    /// Neighbor descriptors per minutia (default: 20).
    pub num_neighbors: usize,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            max_minutiae: 64,
            num_neighbors: 20,
        }
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
}

/// Resolves the settings path: `custom` if given, else the default.
pub fn settings_path(custom: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom {
        Some(p) => Ok(PathBuf::from(p)),
        None => default_settings_path().ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

/// Loads settings.
///
/// An explicit `custom` path must exist. A missing default file yields the
/// defaults.
pub fn load_settings(custom: Option<&str>) -> anyhow::Result<Settings> {
    let path = settings_path(custom)?;
    if custom.is_none() && !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }

    let content =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read settings {}", path.display()))?;
    let settings =
        parse_settings(&content, &path).with_context(|| format!("invalid settings {}", path.display()))?;
    settings.database.validate()?;
    Ok(settings)
}

/// Parses settings as JSON for `.json` paths and as YAML otherwise.
pub fn parse_settings(content: &str, path: &Path) -> anyhow::Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings = if is_json(path) {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };
    Ok(settings)
}

/// Writes `settings` to `path`, creating its directory.
pub fn save_settings(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = if is_json(path) {
        serde_json::to_string_pretty(settings)?
    } else {
        serde_yaml::to_string(settings)?
    };
    std::fs::write(path, content).with_context(|| format!("failed to write settings {}", path.display()))?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
