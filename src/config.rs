use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::scheduler::SchedulerConfig;

const DEFAULT_DB_NAME: &str = "cadence.db";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_LEARNER: &str = "local";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub learner: String,
    pub log_level: String,
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            learner: DEFAULT_LEARNER.to_string(),
            log_level: "warn".to_string(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Config {
    /// Load from `$CADENCE_CONFIG`, or the default config location, then
    /// apply `CADENCE_DB` and `CADENCE_LEARNER`.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CADENCE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join(CONFIG_FILE_NAME));

        let mut config = Self::from_file(&path)?;

        if let Ok(db) = std::env::var("CADENCE_DB") {
            config.database = Some(PathBuf::from(db));
        }
        config.set_learner(std::env::var("CADENCE_LEARNER").ok());

        Ok(config)
    }

    /// Override the learner. A missing or blank value keeps the current one.
    pub fn set_learner(&mut self, learner: Option<String>) {
        if let Some(learner) = learner.filter(|l| !l.trim().is_empty()) {
            self.learner = learner;
        }
    }

    // A missing file is not an error; it just means defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = Self::parse(&raw)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => {
                let dir = config_dir();
                std::fs::create_dir_all(&dir).ok();
                dir.join(DEFAULT_DB_NAME)
            }
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadence")
}
