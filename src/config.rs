use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::exec::dispatcher::TimeoutBudgets;
use crate::kernel::policy::{RiskTier, SecurityMode};
use crate::nlu::catalog::IntentCategory;

/// Core configuration, loaded from a JSON file. Every field has a usable
/// default, so an absent or partial file still yields a running system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Scores at or above this execute directly.
    pub high_confidence: f32,
    /// Scores below this fall through to chat.
    pub low_confidence: f32,
    pub security_mode: SecurityMode,
    /// Per-category risk reassignments on top of the built-in tiers.
    pub tier_overrides: HashMap<IntentCategory, RiskTier>,
    pub timeouts: TimeoutSettings,
    pub default_location: String,
    pub chat_endpoint: String,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub automation_ms: u64,
    pub storage_ms: u64,
    pub network_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            automation_ms: 5_000,
            storage_ms: 2_000,
            network_ms: 8_000,
        }
    }
}

impl From<&TimeoutSettings> for TimeoutBudgets {
    fn from(settings: &TimeoutSettings) -> Self {
        Self {
            automation: Duration::from_millis(settings.automation_ms),
            storage: Duration::from_millis(settings.storage_ms),
            network: Duration::from_millis(settings.network_ms),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            high_confidence: 0.85,
            low_confidence: 0.4,
            security_mode: SecurityMode::Strict,
            tier_overrides: HashMap::new(),
            timeouts: TimeoutSettings::default(),
            default_location: String::new(),
            chat_endpoint: "http://localhost:8080".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl CoreConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        anyhow::ensure!(
            config.low_confidence <= config.high_confidence,
            "low_confidence must not exceed high_confidence"
        );
        Ok(config)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join("notes.json")
    }
}
