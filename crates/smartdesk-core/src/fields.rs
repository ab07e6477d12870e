//! Field coercion over loosely typed JSON payloads
//!
//! Browser forms and model output both send numbers as strings, omit keys,
//! and use alternate key names. A [`FieldRule`] names a field, the aliases it
//! may arrive under, and the fallback used when it is missing. Validation and
//! the AI normalizer each keep their own rule tables built from these.

use chrono::NaiveDate;
use serde_json::Value;

use crate::dates::format_date;

/// Why a field could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Absent, null, or an empty string
    Missing,
    /// Present but not coercible to a finite number
    NotANumber,
}

/// Value substituted when a field is missing or unusable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Empty,
    Text(&'static str),
    Zero,
    Today,
}

/// One field of a payload: primary key, accepted aliases, fallback
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub fallback: Fallback,
}

impl FieldRule {
    pub const fn new(key: &'static str, fallback: Fallback) -> Self {
        Self {
            key,
            aliases: &[],
            fallback,
        }
    }

    pub const fn with_aliases(
        key: &'static str,
        aliases: &'static [&'static str],
        fallback: Fallback,
    ) -> Self {
        Self {
            key,
            aliases,
            fallback,
        }
    }

    fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.key).chain(self.aliases.iter().copied())
    }

    /// First non-empty text value under the key or one of its aliases
    pub fn raw_text(&self, payload: &Value) -> Result<String, FieldError> {
        self.keys()
            .find_map(|key| as_text(payload.get(key)?))
            .ok_or(FieldError::Missing)
    }

    /// Numeric value under the key or one of its aliases.
    ///
    /// The first key holding anything non-empty decides: a later alias is
    /// not consulted if an earlier one holds garbage.
    pub fn raw_number(&self, payload: &Value) -> Result<f64, FieldError> {
        for key in self.keys() {
            match payload.get(key).map(as_number) {
                Some(Err(FieldError::Missing)) | None => continue,
                Some(result) => return result,
            }
        }
        Err(FieldError::Missing)
    }

    /// Text with the fallback applied
    pub fn text(&self, payload: &Value, today: NaiveDate) -> String {
        self.raw_text(payload)
            .unwrap_or_else(|_| self.fallback_text(today))
    }

    /// Number with the fallback applied (unusable values become 0)
    pub fn number(&self, payload: &Value) -> f64 {
        self.raw_number(payload).unwrap_or(0.0)
    }

    fn fallback_text(&self, today: NaiveDate) -> String {
        match self.fallback {
            Fallback::Empty => String::new(),
            Fallback::Text(text) => text.to_string(),
            Fallback::Zero => "0".to_string(),
            Fallback::Today => format_date(today),
        }
    }
}

/// Non-empty string, or a number rendered as text
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON number or numeric string
pub fn as_number(value: &Value) -> Result<f64, FieldError> {
    match value {
        Value::Null => Err(FieldError::Missing),
        Value::Number(n) => n.as_f64().ok_or(FieldError::NotANumber),
        Value::String(s) if s.trim().is_empty() => Err(FieldError::Missing),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(FieldError::NotANumber),
        _ => Err(FieldError::NotANumber),
    }
}

/// Case-insensitive lookup in an allow-list, returning the canonical spelling
pub fn match_allowed(
    value: Option<&str>,
    allowed: &[&'static str],
    fallback: &'static str,
) -> &'static str {
    value
        .map(str::trim)
        .and_then(|v| allowed.iter().copied().find(|a| a.eq_ignore_ascii_case(v)))
        .unwrap_or(fallback)
}
