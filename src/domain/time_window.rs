//! Classifies clock-in and clock-out times against a shift's boundaries.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

use super::clock::TimeOfDay;

/// Earliest a clock-in is accepted, relative to shift start.
pub const CHECK_IN_WINDOW_MINUTES: i64 = 60;

/// Shifts ending before this hour run past midnight.
pub const NIGHT_SHIFT_END_HOUR: u8 = 7;

const NOON_MINUTES: u32 = 12 * 60;

/// Status label stored on an attendance record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize, ToSchema,
)]
pub enum AttendanceStatus {
    #[strum(serialize = "Tepat Waktu")]
    #[serde(rename = "Tepat Waktu")]
    OnTime,
    #[strum(serialize = "Terlambat")]
    #[serde(rename = "Terlambat")]
    Late,
    #[strum(serialize = "Pulang Lebih Awal")]
    #[serde(rename = "Pulang Lebih Awal")]
    EarlyLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Clock-in is only allowed starting from 1 hour before shift start time")]
    TooEarly,
}

pub fn is_night_shift(shift_end: TimeOfDay) -> bool {
    shift_end.hour() < NIGHT_SHIFT_END_HOUR
}

/// On time up to and including shift start, late afterwards. Earlier than
/// one hour before start is not a check-in at all.
pub fn evaluate_check_in(
    clock_in: TimeOfDay,
    shift_start: TimeOfDay,
) -> Result<AttendanceStatus, WindowError> {
    let submitted = i64::from(clock_in.minutes_since_midnight());
    let start = i64::from(shift_start.minutes_since_midnight());

    if submitted < start - CHECK_IN_WINDOW_MINUTES {
        return Err(WindowError::TooEarly);
    }

    if submitted <= start {
        Ok(AttendanceStatus::OnTime)
    } else {
        Ok(AttendanceStatus::Late)
    }
}

/// Leaving before shift end is an early leave; leaving late is never penalised.
pub fn evaluate_check_out(clock_out: TimeOfDay, shift_end: TimeOfDay) -> AttendanceStatus {
    let submitted = clock_out.minutes_since_midnight();
    let end = shift_end.minutes_since_midnight();

    if is_night_shift(shift_end) {
        if end < NOON_MINUTES {
            if submitted < NOON_MINUTES && submitted >= end {
                return AttendanceStatus::OnTime;
            } else if submitted < end {
                return AttendanceStatus::EarlyLeave;
            }
        }
    } else if submitted < end {
        return AttendanceStatus::EarlyLeave;
    }

    AttendanceStatus::OnTime
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn check_in_window_around_nine() {
        let start = t("09:00");
        assert_eq!(evaluate_check_in(t("07:30"), start), Err(WindowError::TooEarly));
        assert_eq!(evaluate_check_in(t("07:59"), start), Err(WindowError::TooEarly));
        assert_eq!(evaluate_check_in(t("08:00"), start), Ok(AttendanceStatus::OnTime));
        assert_eq!(evaluate_check_in(t("08:15"), start), Ok(AttendanceStatus::OnTime));
        assert_eq!(evaluate_check_in(t("09:00"), start), Ok(AttendanceStatus::OnTime));
        assert_eq!(evaluate_check_in(t("09:01"), start), Ok(AttendanceStatus::Late));
        assert_eq!(evaluate_check_in(t("09:30"), start), Ok(AttendanceStatus::Late));
    }

    #[test]
    fn check_in_window_for_every_start_minute() {
        for start_min in (0..24 * 60).step_by(7) {
            let start = TimeOfDay::new((start_min / 60) as u8, (start_min % 60) as u8).unwrap();
            for sub_min in (0..24 * 60).step_by(11) {
                let sub = TimeOfDay::new((sub_min / 60) as u8, (sub_min % 60) as u8).unwrap();
                let got = evaluate_check_in(sub, start);
                let expected = if sub_min < start_min - 60 {
                    Err(WindowError::TooEarly)
                } else if sub_min <= start_min {
                    Ok(AttendanceStatus::OnTime)
                } else {
                    Ok(AttendanceStatus::Late)
                };
                assert_eq!(got, expected, "start {start} submitted {sub}");
            }
        }
    }

    #[test]
    fn day_shift_check_out() {
        let end = t("17:00");
        assert_eq!(evaluate_check_out(t("16:45"), end), AttendanceStatus::EarlyLeave);
        assert_eq!(evaluate_check_out(t("17:00"), end), AttendanceStatus::OnTime);
        assert_eq!(evaluate_check_out(t("17:05"), end), AttendanceStatus::OnTime);
        assert_eq!(evaluate_check_out(t("23:59"), end), AttendanceStatus::OnTime);
    }

    #[test]
    fn night_shift_check_out() {
        let end = t("06:00");
        assert!(is_night_shift(end));
        assert_eq!(evaluate_check_out(t("05:30"), end), AttendanceStatus::EarlyLeave);
        assert_eq!(evaluate_check_out(t("06:00"), end), AttendanceStatus::OnTime);
        assert_eq!(evaluate_check_out(t("06:15"), end), AttendanceStatus::OnTime);
        // afternoon or evening check-outs fall through to on time
        assert_eq!(evaluate_check_out(t("13:00"), end), AttendanceStatus::OnTime);
        assert_eq!(evaluate_check_out(t("23:00"), end), AttendanceStatus::OnTime);
    }

    #[test]
    fn seven_is_not_a_night_shift_end() {
        assert!(!is_night_shift(t("07:00")));
        assert!(is_night_shift(t("06:59")));
        assert_eq!(evaluate_check_out(t("06:30"), t("07:00")), AttendanceStatus::EarlyLeave);
    }

    #[test]
    fn malformed_times_never_become_a_status() {
        let err = TimeOfDay::parse_field("0830", "clock_in").unwrap_err();
        assert_eq!(err.field(), "clock_in");
        assert!(TimeOfDay::parse_field("five", "end_time").is_err());
    }

    #[test]
    fn status_labels_match_storage() {
        assert_eq!(AttendanceStatus::OnTime.to_string(), "Tepat Waktu");
        assert_eq!(AttendanceStatus::Late.as_ref(), "Terlambat");
        assert_eq!(
            "Pulang Lebih Awal".parse::<AttendanceStatus>(),
            Ok(AttendanceStatus::EarlyLeave)
        );
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Late).unwrap(),
            "\"Terlambat\""
        );
    }
}
