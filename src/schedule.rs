use chrono::{Local, NaiveDate, Timelike};

use crate::model::*;

pub const DEFAULT_OPEN_HOUR: u32 = 9;
pub const DEFAULT_CLOSE_HOUR: u32 = 22;

/// Daily booking hours. `close_hour` is the last bookable hour, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            open_hour: DEFAULT_OPEN_HOUR,
            close_hour: DEFAULT_CLOSE_HOUR,
        }
    }
}

impl OpeningHours {
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour,
            close_hour,
        }
    }

    /// The hour slots still bookable as of `now`.
    ///
    /// From the current hour through today's `close_hour`. Once past the
    /// cutoff, the whole of tomorrow from `open_hour` to `close_hour`.
    /// Early-morning hours before `open_hour` are not clamped.
    pub fn window(&self, now: Ms) -> Vec<HourSlot> {
        let Some(wall) = to_naive(now) else {
            return Vec::new();
        };

        let (first, day) = if wall.hour() > self.close_hour {
            let Some(tomorrow) = wall.date().succ_opt() else {
                return Vec::new();
            };
            match at_hour(tomorrow, self.open_hour) {
                Some(first) => (first, tomorrow),
                None => return Vec::new(),
            }
        } else {
            (HourSlot::of(now), wall.date())
        };
        let Some(last) = at_hour(day, self.close_hour) else {
            return Vec::new();
        };

        let mut slots = Vec::new();
        let mut slot = first;
        while slot <= last {
            slots.push(slot);
            slot = slot.next();
        }
        slots
    }
}

fn at_hour(day: NaiveDate, hour: u32) -> Option<HourSlot> {
    day.and_hms_opt(hour, 0, 0)
        .map(|dt| HourSlot::of(from_naive(dt)))
}

/// The local wall clock as [`Ms`].
pub fn wall_clock_now() -> Ms {
    from_naive(Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Ms {
        parse_wall_clock(s).unwrap()
    }

    fn labels(slots: &[HourSlot]) -> Vec<String> {
        slots.iter().map(|s| s.label()).collect()
    }

    #[test]
    fn evening_runs_to_cutoff() {
        let hours = OpeningHours::default();
        let slots = hours.window(at("2024-01-01 18:20"));
        assert_eq!(
            labels(&slots),
            vec![
                "2024-01-01 18:00",
                "2024-01-01 19:00",
                "2024-01-01 20:00",
                "2024-01-01 21:00",
                "2024-01-01 22:00",
            ]
        );
    }

    #[test]
    fn cutoff_hour_itself_is_bookable() {
        let hours = OpeningHours::default();
        let slots = hours.window(at("2024-01-01 22:59"));
        assert_eq!(labels(&slots), vec!["2024-01-01 22:00"]);
    }

    #[test]
    fn past_cutoff_rolls_to_next_opening() {
        let hours = OpeningHours::default();
        let slots = hours.window(at("2024-01-01 23:10"));
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0].label(), "2024-01-02 09:00");
        assert_eq!(slots[13].label(), "2024-01-02 22:00");
    }

    #[test]
    fn rollover_crosses_month_end() {
        let hours = OpeningHours::default();
        let slots = hours.window(at("2024-02-29 23:00"));
        assert_eq!(slots[0].label(), "2024-03-01 09:00");
    }

    #[test]
    fn early_morning_not_clamped_to_opening() {
        let hours = OpeningHours::default();
        let slots = hours.window(at("2024-01-01 03:00"));
        assert_eq!(slots.len(), 20);
        assert_eq!(slots[0].label(), "2024-01-01 03:00");
        assert_eq!(slots[19].label(), "2024-01-01 22:00");
    }

    #[test]
    fn slots_are_consecutive_hours() {
        let hours = OpeningHours::new(10, 20);
        let slots = hours.window(at("2024-06-01 23:30"));
        assert_eq!(slots.len(), 11);
        for pair in slots.windows(2) {
            assert_eq!(pair[1].start_ms() - pair[0].start_ms(), HOUR_MS);
        }
    }

    #[test]
    fn inverted_hours_yield_empty_window() {
        let hours = OpeningHours::new(20, 10);
        assert!(hours.window(at("2024-01-01 23:00")).is_empty());
    }

    #[test]
    fn wall_clock_is_hour_aligned_after_truncation() {
        let now = wall_clock_now();
        assert_eq!(HourSlot::of(now).start_ms() % HOUR_MS, 0);
    }
}
