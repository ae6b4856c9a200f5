//! The sail configuration itself: main state, headsail, downwind sail,
//! staysail flag, and a free-text comment.

use serde::{Deserialize, Serialize};

/// The headsail that may double as a staysail.
pub const JIB: &str = "JIB";

/// The only downwind sail the staysail combination is valid under.
pub const REACHING_SPI: &str = "REACHING_SPI";

/// A complete sail configuration as selected by the crew.
///
/// Option values are boat-configured strings, validated against
/// [`crate::config::BoatConfig`] at the edit boundary. The main sail always
/// has a state; headsail and downwind are each single-select or absent.
///
/// `staysail` is only meaningful when the jib is flown alongside the
/// reaching spinnaker — [`Selection::staysail_compatible`] — and every edit
/// path keeps it `false` outside that combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Main sail state (e.g. `DOWN`, `FULL`, `R1`..`R4`).
    pub main: String,

    /// Headsail, if one is flown (e.g. `JIB`, `J1`, `STORM`).
    pub headsail: Option<String>,

    /// Downwind sail, if one is flown (e.g. `BIGGEE`, `REACHING_SPI`).
    pub downwind: Option<String>,

    /// Jib flown as a staysail under the reaching spinnaker.
    pub staysail: bool,

    /// Freeform note: conditions, reason for the change.
    #[serde(default)]
    pub comment: String,
}

impl Selection {
    /// The baseline configuration: everything down, nothing flown.
    pub fn all_down(main: &str) -> Self {
        Self {
            main: main.to_string(),
            headsail: None,
            downwind: None,
            staysail: false,
            comment: String::new(),
        }
    }

    /// Whether the staysail flag is allowed to be on for this selection.
    pub fn staysail_compatible(&self) -> bool {
        self.headsail.as_deref() == Some(JIB) && self.downwind.as_deref() == Some(REACHING_SPI)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all_down("DOWN")
    }
}
