//! Field-by-field checks for request bodies and query strings. Every failing
//! field is collected before the request is rejected.

use chrono::NaiveDate;

use crate::domain::clock::{TimeOfDay, parse_wire_date};
use crate::error::{AppResult, AppError, FieldError};

#[derive(Debug, Default)]
pub struct Fields {
    errors: Vec<FieldError>,
}

impl Fields {
    /// Records a failure found outside the typed checks below.
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed, non-empty value.
    pub fn required<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.errors.push(FieldError::required(field));
                None
            }
        }
    }

    /// Present and non-zero.
    pub fn id(&mut self, field: &str, value: Option<u64>) -> Option<u64> {
        match value {
            Some(v) if v > 0 => Some(v),
            _ => {
                self.errors.push(FieldError::required(field));
                None
            }
        }
    }

    /// Lower-cased address with a local part and a dotted domain.
    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let value = self.required(field, value)?;
        let well_formed = value
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.split('.').count() >= 2
                    && domain.split('.').all(|part| !part.is_empty())
            });

        if !well_formed {
            self.fail(field, "Invalid email format");
            return None;
        }
        Some(value.to_lowercase())
    }

    pub fn min_len<'a>(&mut self, field: &str, value: Option<&'a str>, min: usize) -> Option<&'a str> {
        let value = self.required(field, value)?;
        if value.chars().count() < min {
            self.fail(field, format!("Minimum length is {min}"));
            return None;
        }
        Some(value)
    }

    pub fn time(&mut self, field: &'static str, value: Option<&str>) -> Option<TimeOfDay> {
        let value = self.required(field, value)?;
        match TimeOfDay::parse_field(value, field) {
            Ok(t) => Some(t),
            Err(_) => {
                self.fail(field, "Invalid time format. Use HH:MM");
                None
            }
        }
    }

    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let value = self.required(field, value)?;
        self.parse_date(field, value)
    }

    /// Absent or blank is fine; anything else must be `DD-MM-YYYY`.
    pub fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(v) => self.parse_date(field, v),
        }
    }

    fn parse_date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_wire_date(value);
        if parsed.is_none() {
            self.fail(field, "Invalid date format. Use DD-MM-YYYY");
        }
        parsed
    }

    pub fn finish(self) -> AppResult<()> {
        AppError::check_fields(self.errors)
    }
}
