//! Boat configuration.
//!
//! Loaded from `~/.sailplan/boat.toml` (or a `--config` path). The sail
//! option lists here are the universe of valid values for edits; validation
//! against them happens both in the UI layer and, defensively, at the edit
//! boundary.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::model::Selection;
use crate::store::OnCollision;

/// Boat-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoatConfig {
    /// Vessel identity.
    pub boat: Boat,

    /// Sail option lists.
    pub sails: Sails,

    /// Short display names per option value, for buttons and summaries.
    #[serde(default)]
    pub display: HashMap<String, String>,

    /// Store location and collision policy.
    #[serde(default)]
    pub store: StoreSection,

    /// History view defaults.
    #[serde(default)]
    pub history: HistorySection,
}

/// The `[boat]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Boat {
    /// Display name (e.g. "Morticia").
    pub name: String,

    /// Store tag identifying this vessel's records.
    pub vessel: String,

    /// IANA timezone name to display times in. Falls back to UTC when
    /// absent or unknown.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// The `[sails]` section: one ordered option list per sail slot.
#[derive(Debug, Clone, Deserialize)]
pub struct Sails {
    /// Main sail states, baseline first (e.g. DOWN, FULL, R1..R4).
    pub main: SailList,

    /// Headsail choices.
    pub headsail: SailList,

    /// Downwind sail choices.
    pub downwind: SailList,
}

/// An ordered list of sail option values.
#[derive(Debug, Clone, Deserialize)]
pub struct SailList {
    /// Option values, in display order.
    pub options: Vec<String>,
}

/// The `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreSection {
    /// Database path. Defaults to `~/.sailplan/log.sqlite`.
    pub path: Option<PathBuf>,

    /// What to do when a write lands on an existing timestamp.
    #[serde(default)]
    pub on_collision: OnCollision,
}

/// The `[history]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HistorySection {
    /// Maximum entries shown.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// How far back the history view reaches.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_days: default_window_days(),
        }
    }
}

fn default_limit() -> usize {
    50
}

fn default_window_days() -> i64 {
    7
}

impl BoatConfig {
    /// Load config from `~/.sailplan/boat.toml`.
    /// Returns an error if the file is missing or invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        if !path.exists() {
            return Err(format!(
                "no boat config found at {}\n\
                 Copy boat.toml.example there and customize it for your boat.",
                path.display()
            ));
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.sails.main.options.is_empty() {
            return Err(format!(
                "sails.main.options is empty in {} — the main sail needs at \
                 least a baseline state",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.sailplan/boat.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sailplan").join("boat.toml"))
    }

    /// The baseline selection for a fresh log: first main state, nothing
    /// flown.
    pub fn baseline(&self) -> Selection {
        Selection::all_down(&self.sails.main.options[0])
    }

    /// Whether `value` is a configured main sail state.
    pub fn is_main_state(&self, value: &str) -> bool {
        self.sails.main.options.iter().any(|o| o == value)
    }

    /// Whether `value` is a configured headsail.
    pub fn is_headsail(&self, value: &str) -> bool {
        self.sails.headsail.options.iter().any(|o| o == value)
    }

    /// Whether `value` is a configured downwind sail.
    pub fn is_downwind(&self, value: &str) -> bool {
        self.sails.downwind.options.iter().any(|o| o == value)
    }

    /// The short display name for an option value, or the value itself
    /// when no mapping is configured.
    pub fn display_name<'a>(&'a self, value: &'a str) -> &'a str {
        self.display.get(value).map_or(value, String::as_str)
    }
}
