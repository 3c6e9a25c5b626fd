use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use form_spec::BranchPolicy;
use form_store::DeskSettings;
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

pub const CONFIG_ENV: &str = "FORMKIT_CONFIG";
pub const CONFIG_FILE: &str = "formkit.toml";

fn default_expiry_hours() -> u32 {
    24
}

/// Contents of `formkit.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Applied to drafts without an expiry; `0` keeps such forms open.
    #[serde(default = "default_expiry_hours")]
    pub default_expiry_hours: u32,
    #[serde(default)]
    pub branch_policy: BranchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_expiry_hours: default_expiry_hours(),
            branch_policy: BranchPolicy::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "formkit")
}

impl Config {
    /// Loads the first config found among `explicit`, `$FORMKIT_CONFIG` and the
    /// platform config directory; falls back to defaults when none exists.
    ///
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
            return Self::from_file(Path::new(&path));
        }
        if let Some(dirs) = project_dirs() {
            let path = dirs.config_dir().join(CONFIG_FILE);
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Configured data directory, else the platform data directory.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".formkit"))
    }

    pub fn desk_settings(&self) -> DeskSettings {
        let default_expiry = (self.default_expiry_hours > 0)
            .then(|| Duration::hours(i64::from(self.default_expiry_hours)));
        DeskSettings {
            default_expiry,
            branch_policy: self.branch_policy,
        }
    }
}
