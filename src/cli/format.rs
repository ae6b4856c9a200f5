//! Human-readable rendering of selections and log entries.

use jiff::Timestamp;

use crate::config::BoatConfig;
use crate::model::{LogEntry, Selection};
use crate::tz::BoatClock;

/// Full summary line, e.g. `Main: FULL + Jib (S) + R-Spi`.
///
/// "All sails down" when the main is at its baseline state and nothing
/// else is flown.
pub fn selection_summary(selection: &Selection, config: &BoatConfig) -> String {
    if selection.headsail.is_none()
        && selection.downwind.is_none()
        && selection.main == config.sails.main.options[0]
    {
        return "All sails down".to_string();
    }

    let mut parts = vec![format!("Main: {}", config.display_name(&selection.main))];
    if let Some(headsail) = &selection.headsail {
        let mut name = config.display_name(headsail).to_string();
        if selection.staysail {
            name.push_str(" (S)");
        }
        parts.push(name);
    }
    if let Some(downwind) = &selection.downwind {
        parts.push(config.display_name(downwind).to_string());
    }
    parts.join(" + ")
}

/// Compact history row: local time, configuration, comment.
///
/// e.g. `06/12 14:32 CDT  M:FULL + Jib(S) + Whomper  "reef early"`
pub fn history_line(
    entry: &LogEntry,
    config: &BoatConfig,
    clock: &BoatClock,
    now: Timestamp,
) -> String {
    let selection = &entry.selection;

    let mut parts = vec![format!("M:{}", config.display_name(&selection.main))];
    if let Some(headsail) = &selection.headsail {
        let mut name = config.display_name(headsail).to_string();
        if selection.staysail {
            name.push_str("(S)");
        }
        parts.push(name);
    }
    if let Some(downwind) = &selection.downwind {
        parts.push(config.display_name(downwind).to_string());
    }

    let mut line = format!(
        "{}  {}",
        clock.format_datetime(entry.timestamp, now),
        parts.join(" + ")
    );
    if !selection.comment.is_empty() {
        line.push_str("  \"");
        line.push_str(&selection.comment);
        line.push('"');
    }
    line
}
