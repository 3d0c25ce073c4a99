// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON configuration file (§6): accounts, feature flags, and the
//! policy knobs the engine's delegation-depth and auto-launcher rules
//! need that the distilled wire shape leaves implicit. Unknown top-level
//! keys round-trip unchanged through `extra`; a file saved before
//! `schemaVersion` existed is migrated in place, with a `.bak` copy of
//! the original written first.

use hubd_core::{Account, HubError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaPolicy {
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default)]
    pub estimated_limit: Option<u64>,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_plan() -> String {
    "unknown".to_string()
}

fn default_window_ms() -> u64 {
    5 * 60 * 60 * 1000
}

fn default_source() -> String {
    "default".to_string()
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self { plan: default_plan(), window_ms: default_window_ms(), estimated_limit: None, source: default_source() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default)]
    pub launch_in_new_window: bool,
    #[serde(default)]
    pub quota_policy: QuotaPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntireConfig {
    #[serde(default)]
    pub auto_enable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default)]
    pub auto_acceptance_gate: bool,
    #[serde(default)]
    pub adaptive_sla: bool,
    #[serde(default)]
    pub auto_launcher: bool,
    /// Unknown feature flags (e.g. the council/bridge subsystems this
    /// daemon doesn't implement) preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Policy knobs `hubd-engine` needs that §6's wire shape doesn't name:
/// delegation-depth enforcement and the auto-launcher's thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_dedup_window_ms")]
    pub deduplication_window_ms: u64,
    #[serde(default = "default_max_spawns_per_minute")]
    pub max_spawns_per_minute: u32,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_ms() -> u64 {
    5 * 60_000
}

fn default_dedup_window_ms() -> u64 {
    30_000
}

fn default_max_spawns_per_minute() -> u32 {
    10
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(5),
            failure_threshold: default_failure_threshold(),
            cooldown_ms: default_cooldown_ms(),
            deduplication_window_ms: default_dedup_window_ms(),
            max_spawns_per_minute: default_max_spawns_per_minute(),
        }
    }
}

impl PolicyConfig {
    pub fn launcher_policy(&self) -> hubd_engine::LauncherPolicy {
        hubd_engine::LauncherPolicy {
            self_handoff_blocked: true,
            failure_threshold: self.failure_threshold,
            cooldown_ms: self.cooldown_ms,
            deduplication_window_ms: self.deduplication_window_ms,
            max_spawns_per_minute: self.max_spawns_per_minute,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub entire: EntireConfig,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Preserves unrecognized top-level keys verbatim across a load/save
    /// round trip, per §6.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            accounts: Vec::new(),
            entire: EntireConfig::default(),
            defaults: Defaults::default(),
            features: Features::default(),
            theme: None,
            policy: PolicyConfig::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Config {
    /// Loads the config at `path`, writing a fresh default one if absent.
    /// A file with no `schemaVersion` key is migrated in place: a `.bak`
    /// copy of the original bytes is written first, then the same file is
    /// rewritten with `schemaVersion` set before being parsed.
    pub fn load(path: &Path) -> Result<Self, HubError> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)?;
        let mut value: serde_json::Value = serde_json::from_str(&raw)?;

        if value.get("schemaVersion").is_none() {
            tracing::warn!(path = %path.display(), "config file missing schemaVersion; migrating in place");
            let backup_path = path.with_extension("json.bak");
            hubd_storage::atomic::replace(&backup_path, raw.as_bytes())?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("schemaVersion".to_string(), serde_json::json!(CURRENT_SCHEMA_VERSION));
            }
            let migrated = serde_json::to_vec_pretty(&value)?;
            hubd_storage::atomic::replace(path, &migrated)?;
        }

        let config: Config = serde_json::from_value(value)?;
        if let Some(dup) = hubd_core::account::find_duplicate_name(&config.accounts) {
            return Err(HubError::validation(format!("duplicate account name in config: {dup}")));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), HubError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        hubd_storage::atomic::replace(path, &bytes)?;
        Ok(())
    }

    pub fn find_account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}
