//! Boat-local time: timezone resolution with a UTC fallback.
//!
//! Where the boat is — and therefore what zone to display times in — comes
//! from a pluggable [`TimezoneSource`] (a GPS-derived IANA name in a full
//! installation, a configured name otherwise). An absent or unknown name is
//! never an error: times simply render in UTC.

use std::cell::RefCell;

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

/// Where the boat's IANA timezone name comes from.
pub trait TimezoneSource {
    /// The current IANA timezone name, or `None` when no fix is available.
    fn current_timezone(&self) -> Option<String>;
}

/// A source pinned to a configured IANA name.
pub struct Fixed(pub String);

impl TimezoneSource for Fixed {
    fn current_timezone(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A source with no position information.
pub struct NoFix;

impl TimezoneSource for NoFix {
    fn current_timezone(&self) -> Option<String> {
        None
    }
}

/// Resolves the boat's timezone and renders local times.
///
/// Lookups are cached for the freshness window (ten minutes, matching how
/// often a moving boat can plausibly change zone) so a slow or flaky source
/// isn't consulted on every render.
pub struct BoatClock {
    source: Box<dyn TimezoneSource>,
    freshness: SignedDuration,
    cached: RefCell<Option<(Timestamp, TimeZone)>>,
}

impl BoatClock {
    /// A clock over the given source with the default freshness window.
    pub fn new(source: Box<dyn TimezoneSource>) -> Self {
        Self::with_freshness(source, SignedDuration::from_secs(600))
    }

    /// A clock with an explicit freshness window.
    pub fn with_freshness(source: Box<dyn TimezoneSource>, freshness: SignedDuration) -> Self {
        Self {
            source,
            freshness,
            cached: RefCell::new(None),
        }
    }

    /// The boat's timezone as of `now`, UTC when the source has nothing or
    /// names a zone the tz database doesn't know.
    pub fn timezone(&self, now: Timestamp) -> TimeZone {
        let mut cached = self.cached.borrow_mut();
        if let Some((resolved_at, tz)) = cached.as_ref()
            && now.duration_since(*resolved_at) < self.freshness
        {
            return tz.clone();
        }

        let tz = self
            .source
            .current_timezone()
            .and_then(|name| TimeZone::get(&name).ok())
            .unwrap_or(TimeZone::UTC);
        *cached = Some((now, tz.clone()));
        tz
    }

    /// Compact local time, like `14:32`.
    pub fn format_time(&self, ts: Timestamp, now: Timestamp) -> String {
        ts.to_zoned(self.timezone(now)).strftime("%H:%M").to_string()
    }

    /// Local date and time with zone abbreviation, like `01/15 14:32 CDT`.
    pub fn format_datetime(&self, ts: Timestamp, now: Timestamp) -> String {
        ts.to_zoned(self.timezone(now))
            .strftime("%m/%d %H:%M %Z")
            .to_string()
    }
}
