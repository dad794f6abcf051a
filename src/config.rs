use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::plans::PlanId;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub plan: Option<String>,
    pub default_model: Option<String>,
    pub assist_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Parse the configured plan, if any. Unknown plan names are errors,
    /// never silently replaced with a default.
    pub fn plan_id(&self) -> Result<Option<PlanId>> {
        self.plan
            .as_deref()
            .map(|s| s.parse::<PlanId>())
            .transpose()
            .map_err(anyhow::Error::from)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("concierge").join("config.json"))
    }
}
