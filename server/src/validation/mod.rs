//! Request Validation
//!
//! One validator per entity. Each reads a parsed [`MultipartForm`], collects
//! every violation in a single pass and either returns typed input ready to be
//! assembled into a document or the full list of [`FieldError`]s.
//!
//! Validators never touch storage or the network.
//!
//! [`MultipartForm`]: crate::forms::MultipartForm

mod menu;
mod outlet;
mod room;
mod roommate;
mod user;

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use validator::{ValidateEmail, ValidateLength, ValidateRange, ValidateUrl};

use crate::forms::FieldMap;
use crate::storage::is_blocked_host;

pub use menu::{validate_menu_item, MenuItemInput};
pub use outlet::{validate_outlet, OutletInput};
pub use room::{validate_room, RoomInput, MAX_ROOM_IMAGES};
pub use roommate::{validate_roommate, RoommateInput};
pub use user::{validate_user, UserInput};

static TEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `coordinates.lat`.
    pub field: String,
    pub message: String,
}

/// Every violation found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// Whether any error is reported against `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    #[must_use]
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// Accumulates violations while reading typed values out of a [`FieldMap`].
///
/// Every accessor returns `None` after recording an error, so validators can
/// read all fields unconditionally and decide at the end with [`finish`].
///
/// [`finish`]: Checker::finish
pub(crate) struct Checker<'a> {
    fields: &'a FieldMap,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    pub(crate) const fn new(fields: &'a FieldMap) -> Self {
        Self {
            fields,
            errors: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record `message` against `field` unless `ok` holds.
    pub(crate) fn ensure(&mut self, ok: bool, field: &str, message: impl Into<String>) -> bool {
        if !ok {
            self.fail(field, message);
        }
        ok
    }

    /// A non-blank value.
    pub(crate) fn required(&mut self, key: &str, label: &str) -> Option<&'a str> {
        let value = self.fields.text(key);
        if value.is_none() {
            self.fail(key, format!("{label} is required."));
        }
        value
    }

    /// A non-blank value whose length in characters is within `min..=max`.
    pub(crate) fn text(&mut self, key: &str, label: &str, min: u64, max: u64) -> Option<String> {
        let value = self.required(key, label)?;
        if !value.validate_length(Some(min), None, None) {
            self.fail(key, format!("{label} must be at least {min} characters long."));
            return None;
        }
        if !value.validate_length(None, Some(max), None) {
            self.fail(key, format!("{label} must not exceed {max} characters."));
            return None;
        }
        Some(value.to_string())
    }

    /// An optional value no longer than `max` characters.
    pub(crate) fn optional_text(&mut self, key: &str, label: &str, max: u64) -> Option<String> {
        let value = self.fields.text(key)?;
        if !value.validate_length(None, Some(max), None) {
            self.fail(key, format!("{label} must not exceed {max} characters."));
            return None;
        }
        Some(value.to_string())
    }

    /// A finite number.
    pub(crate) fn number(&mut self, key: &str, label: &str) -> Option<f64> {
        let raw = self.required(key, label)?;
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => {
                self.fail(key, format!("{label} must be a number."));
                None
            }
        }
    }

    /// A whole number within `min..=max`.
    pub(crate) fn integer(&mut self, key: &str, label: &str, min: i32, max: i32) -> Option<i32> {
        let n = self.number(key, label)?;
        if n.fract() != 0.0 {
            self.fail(key, format!("{label} must be an integer."));
            return None;
        }
        if !n.validate_range(Some(f64::from(min)), Some(f64::from(max)), None, None) {
            let message = if max == i32::MAX {
                format!("{label} must be {min} or greater.")
            } else {
                format!("{label} must be between {min} and {max}.")
            };
            self.fail(key, message);
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(n as i32)
    }

    /// One of the display strings accepted by `T`.
    pub(crate) fn choice<T: FromStr>(&mut self, key: &str, label: &str, invalid: &str) -> Option<T> {
        let raw = self.required(key, label)?;
        let parsed = raw.parse::<T>().ok();
        if parsed.is_none() {
            self.fail(key, invalid);
        }
        parsed
    }

    /// Exactly ten ASCII digits.
    pub(crate) fn phone(&mut self, key: &str, label: &str) -> Option<String> {
        let raw = self.required(key, label)?;
        if TEN_DIGITS.is_match(raw) {
            Some(raw.to_string())
        } else {
            self.fail(key, format!("{label} must be a valid 10-digit number."));
            None
        }
    }

    /// A syntactically valid email address, lower-cased.
    pub(crate) fn email(&mut self, key: &str, label: &str) -> Option<String> {
        let raw = self.required(key, label)?;
        if raw.validate_email() {
            Some(raw.to_lowercase())
        } else {
            self.fail(key, format!("{label} must be a valid email address."));
            None
        }
    }

    /// An absolute `http` or `https` URL whose host is not a loopback,
    /// private or reserved address.
    pub(crate) fn public_http_url(&mut self, key: &str, label: &str) -> Option<String> {
        let raw = self.required(key, label)?;
        let scheme_ok = raw.starts_with("http://") || raw.starts_with("https://");
        let host = reqwest::Url::parse(raw)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));
        match host {
            Some(host) if scheme_ok && raw.validate_url() => {
                if is_blocked_host(&host) {
                    self.fail(key, format!("{label} must not point to a private address."));
                    None
                } else {
                    Some(raw.to_string())
                }
            }
            _ => {
                self.fail(key, format!("{label} must be a valid http(s) URL."));
                None
            }
        }
    }

    /// A boolean flag; absent means `false`.
    pub(crate) fn flag(&mut self, key: &str, label: &str) -> bool {
        match self.fields.text(key).map(str::to_ascii_lowercase).as_deref() {
            None | Some("false" | "0" | "off" | "no") => false,
            Some("true" | "1" | "on" | "yes") => true,
            Some(_) => {
                self.fail(key, format!("{label} must be true or false."));
                false
            }
        }
    }

    /// A non-empty list of non-blank strings.
    pub(crate) fn non_empty_list(&mut self, key: &str, label: &str) -> Option<Vec<String>> {
        let values = self.fields.list(key);
        if values.is_empty() {
            self.fail(key, format!("{label} must contain at least 1 item."));
            return None;
        }
        Some(values)
    }

    /// A calendar date or an RFC 3339 timestamp.
    pub(crate) fn timestamp(&mut self, key: &str, label: &str) -> Option<DateTime<Utc>> {
        let raw = self.required(key, label)?;
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            self.fail(key, format!("{label} must be a valid date."));
        }
        parsed
    }

    /// An optional `YYYY-MM-DD` date (a timestamp is truncated to its date).
    pub(crate) fn optional_date(&mut self, key: &str, label: &str) -> Option<NaiveDate> {
        let raw = self.fields.text(key)?;
        let parsed = parse_timestamp(raw).map(|ts| ts.date_naive());
        if parsed.is_none() {
            self.fail(key, format!("{label} must be a valid date."));
        }
        parsed
    }

    /// Return `value` if no violation was recorded.
    pub(crate) fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(ValidationErrors(self.errors));
        }
        value().ok_or_else(|| {
            ValidationErrors(vec![FieldError {
                field: String::new(),
                message: "Invalid submission.".into(),
            }])
        })
    }
}

/// Parse RFC 3339, or a bare date taken as midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
