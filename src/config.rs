use crate::player::DEFAULT_VOLUME;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "tunevibes";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_discover_count")]
    pub discover_count: usize,
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn default_recent_limit() -> usize {
    5
}

fn default_discover_count() -> usize {
    6
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            volume: default_volume(),
            recent_limit: default_recent_limit(),
            discover_count: default_discover_count(),
        }
    }
}

pub fn data_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("TUNEVIBES_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(data_root()?.join(SETTINGS_FILE))
}

pub fn ensure_data_dir() -> Result<PathBuf> {
    let root = data_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}
