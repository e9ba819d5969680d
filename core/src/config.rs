use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::repository::file::DEFAULT_FILE_NAME;

pub const CONFIG_FILE_NAME: &str = "config.json";
const DATA_DIR_NAME: &str = ".tasuke";
const LOG_DIR_NAME: &str = "logs";

/// User settings, stored as `config.json` in the data directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub tasks_file: String,
    pub log_level: String,
    /// Treat a line with no known command as `add <line>`.
    pub implicit_add: bool,
    /// How long before a task begins the reminder shows up.
    pub reminder_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: DEFAULT_FILE_NAME.to_string(),
            log_level: "info".to_string(),
            implicit_add: false,
            reminder_minutes: 10,
        }
    }
}

impl Config {
    /// Reads `<data_dir>/config.json`; a missing file gives the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(&path).with_context(|| format!("could not open {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("{} is not a valid config file", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// `~/.tasuke`, unless an explicit directory is given.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => {
            let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
            Ok(home_dir.join(DATA_DIR_NAME))
        }
    }
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_DIR_NAME)
}
