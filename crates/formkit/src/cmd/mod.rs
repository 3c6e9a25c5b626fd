pub mod export;
pub mod form;
pub mod responses;
pub mod schema;
pub mod submit;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use form_store::{FormDesk, FsStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;

/// Resolved config plus command line overrides, shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    data_dir: PathBuf,
}

impl Session {
    pub fn new(config: Config, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| config.data_dir());
        Self { config, data_dir }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn desk(&self) -> Result<FormDesk<FsStore>> {
        debug!(data_dir = %self.data_dir.display(), "opening store");
        let store = FsStore::open(&self.data_dir)
            .with_context(|| format!("failed to open store at {}", self.data_dir.display()))?;
        Ok(FormDesk::new(store).with_settings(self.config.desk_settings()))
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
