//! Settings file (`routeslips.toml`).

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "routeslips.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<code>.txt` circuit files.
    pub data_dir: PathBuf,
    /// SQLite file for delivery and route state.
    pub state_db: PathBuf,
    /// Hide stops carrying STF products in listings.
    pub hide_stf: bool,
    /// Display names keyed by circuit code.
    pub circuit_names: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            state_db: PathBuf::from("routeslips.db"),
            hide_stf: false,
            circuit_names: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read settings from `path`.
    ///
    /// When the file does not exist, defaults are used unless `required` is set.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            if required {
                anyhow::bail!("Config file not found: {:?}", path);
            }
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }
}
