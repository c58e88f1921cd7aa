use std::fmt;

use super::clock::{MINUTES_PER_DAY, TimeOfDay};

/// Worked time between a clock-in and a clock-out on the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkDuration {
    minutes: u32,
}

impl WorkDuration {
    /// A clock-out earlier than the clock-in wraps once past midnight.
    pub fn between(clock_in: TimeOfDay, clock_out: TimeOfDay) -> Self {
        let start = clock_in.minutes_since_midnight();
        let mut end = clock_out.minutes_since_midnight();
        if end < start {
            end += MINUTES_PER_DAY;
        }
        Self {
            minutes: end - start,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.minutes
    }

    pub fn hours(&self) -> u32 {
        self.minutes / 60
    }

    pub fn remaining_minutes(&self) -> u32 {
        self.minutes % 60
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} jam {} menit", self.hours(), self.remaining_minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(clock_in: &str, clock_out: &str) -> String {
        WorkDuration::between(clock_in.parse().unwrap(), clock_out.parse().unwrap()).to_string()
    }

    #[test]
    fn day_shift() {
        assert_eq!(label("08:00", "17:00"), "9 jam 0 menit");
        assert_eq!(label("08:10", "16:55"), "8 jam 45 menit");
    }

    #[test]
    fn overnight_wraps_once() {
        assert_eq!(label("22:00", "06:00"), "8 jam 0 menit");
        assert_eq!(label("23:45", "00:15"), "0 jam 30 menit");
    }

    #[test]
    fn same_time_is_zero() {
        let t: TimeOfDay = "12:00".parse().unwrap();
        let d = WorkDuration::between(t, t);
        assert_eq!(d.total_minutes(), 0);
        assert_eq!(d.to_string(), "0 jam 0 menit");
    }

    #[test]
    fn malformed_clock_out_is_reported() {
        let err = TimeOfDay::parse_field("5pm", "clock_out").unwrap_err();
        assert_eq!(err.field(), "clock_out");
        assert_eq!(err.to_string(), "Invalid Format");
    }
}
