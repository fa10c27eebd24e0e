use std::fmt;

use chrono::{DateTime, NaiveDateTime};

/// Wall-clock milliseconds since the Unix epoch, no timezone. The only time type.
pub type Ms = i64;

pub const HOUR_MS: Ms = 3_600_000;

/// Earliest hour-aligned instant an `Ms` can hold.
const FIRST_HOUR: Ms = Ms::MIN + (HOUR_MS - Ms::MIN.rem_euclid(HOUR_MS)) % HOUR_MS;

const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A timestamp truncated to the start of its clock hour. The booking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourSlot(Ms);

impl HourSlot {
    /// Zero the minutes, seconds and milliseconds of `t`.
    /// Floors, so instants before the epoch still land in the hour that contains them.
    /// Instants in the partial hour at the very bottom of the range clamp up to
    /// the first whole hour.
    pub fn of(t: Ms) -> Self {
        Self(t.checked_sub(t.rem_euclid(HOUR_MS)).unwrap_or(FIRST_HOUR))
    }

    pub fn start_ms(self) -> Ms {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + HOUR_MS)
    }

    /// `yyyy-MM-dd HH:mm`
    pub fn label(self) -> String {
        match to_naive(self.0) {
            Some(dt) => dt.format(LABEL_FORMAT).to_string(),
            None => self.0.to_string(),
        }
    }
}

impl fmt::Display for HourSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

pub fn to_naive(t: Ms) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(t).map(|dt| dt.naive_utc())
}

pub fn from_naive(dt: NaiveDateTime) -> Ms {
    dt.and_utc().timestamp_millis()
}

/// Parse `yyyy-MM-dd HH:mm[:ss]` (space or `T` separated) as wall-clock time.
pub fn parse_wall_clock(s: &str) -> Option<Ms> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(from_naive)
}

/// How booked an hour is, for the availability view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// Every table is free.
    Open,
    /// Some tables taken, some free.
    Partial,
    /// No table left.
    Full,
}

impl Occupancy {
    pub fn classify(free: u32, capacity: u32) -> Self {
        if free == 0 {
            Occupancy::Full
        } else if free < capacity {
            Occupancy::Partial
        } else {
            Occupancy::Open
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Occupancy::Open => "open",
            Occupancy::Partial => "partial",
            Occupancy::Full => "full",
        }
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCount {
    pub slot: HourSlot,
    pub reservations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot: HourSlot,
    pub free: u32,
    pub status: Occupancy,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX_PM: Ms = 1_704_132_000_000; // 2024-01-01 18:00

    #[test]
    fn slot_truncates_to_hour() {
        assert_eq!(HourSlot::of(SIX_PM).start_ms(), SIX_PM);
        assert_eq!(HourSlot::of(SIX_PM + 45 * 60_000), HourSlot::of(SIX_PM));
        assert_eq!(HourSlot::of(SIX_PM + HOUR_MS - 1), HourSlot::of(SIX_PM));
        assert_ne!(HourSlot::of(SIX_PM + HOUR_MS), HourSlot::of(SIX_PM));
    }

    #[test]
    fn slot_floors_negative_timestamps() {
        assert_eq!(HourSlot::of(-1).start_ms(), -HOUR_MS);
        assert_eq!(HourSlot::of(-HOUR_MS).start_ms(), -HOUR_MS);
    }

    #[test]
    fn slot_of_extremes_does_not_overflow() {
        let lowest = HourSlot::of(Ms::MIN).start_ms();
        assert_eq!(lowest.rem_euclid(HOUR_MS), 0);
        assert!(lowest - Ms::MIN < HOUR_MS);
        assert_eq!(HourSlot::of(Ms::MIN + 1), HourSlot::of(Ms::MIN));

        let highest = HourSlot::of(Ms::MAX).start_ms();
        assert_eq!(highest.rem_euclid(HOUR_MS), 0);
        assert!(Ms::MAX - highest < HOUR_MS);
    }

    #[test]
    fn slot_ordering_and_next() {
        let slot = HourSlot::of(SIX_PM);
        assert!(slot < slot.next());
        assert_eq!(slot.next().start_ms(), SIX_PM + HOUR_MS);
    }

    #[test]
    fn slot_label() {
        assert_eq!(HourSlot::of(SIX_PM + 59 * 60_000).label(), "2024-01-01 18:00");
        assert_eq!(HourSlot::of(SIX_PM).to_string(), "2024-01-01 18:00");
    }

    #[test]
    fn wall_clock_formats() {
        assert_eq!(parse_wall_clock("2024-01-01 18:00"), Some(SIX_PM));
        assert_eq!(parse_wall_clock("2024-01-01T18:45:00"), Some(SIX_PM + 45 * 60_000));
        assert_eq!(parse_wall_clock(" 2024-01-01 18:00:30 "), Some(SIX_PM + 30_000));
        assert_eq!(parse_wall_clock("tomorrow"), None);
        assert_eq!(parse_wall_clock("2024-13-01 18:00"), None);
    }

    #[test]
    fn naive_roundtrip_keeps_wall_clock() {
        let dt = to_naive(SIX_PM).unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "18:00");
        assert_eq!(from_naive(dt), SIX_PM);
    }

    #[test]
    fn occupancy_classification() {
        assert_eq!(Occupancy::classify(0, 10), Occupancy::Full);
        assert_eq!(Occupancy::classify(3, 10), Occupancy::Partial);
        assert_eq!(Occupancy::classify(10, 10), Occupancy::Open);
        assert_eq!(Occupancy::Partial.as_str(), "partial");
    }
}
