//! Date and time translators.
//!
//! | Descriptor | Format |
//! |---|---|
//! | `date` | `YYYY-MM-DD` |
//! | `datetime` | `YYYY-MM-DDTHH:MM:SS[.fff]` |
//! | `offset_datetime` | RFC 3339 |

use crate::translator::{FromWire, ToWire};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use covenant_core::{names, Native, TranslationError, TranslationResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Calendar dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTranslator;

impl ToWire for DateTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::Date(date) => Ok(date.format(DATE_FORMAT).to_string()),
            other => Err(other.mismatch(names::DATE)),
        }
    }
}

impl FromWire for DateTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Native::Date)
            .map_err(|e| TranslationError::malformed(names::DATE, text, e))
    }
}

/// Local date-times.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeTranslator;

impl ToWire for DateTimeTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::DateTime(at) => Ok(at.format(DATETIME_FORMAT).to_string()),
            other => Err(other.mismatch(names::DATETIME)),
        }
    }
}

impl FromWire for DateTimeTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        NaiveDateTime::parse_from_str(text.trim(), DATETIME_FORMAT)
            .map(Native::DateTime)
            .map_err(|e| TranslationError::malformed(names::DATETIME, text, e))
    }
}

/// Date-times with a UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetDateTimeTranslator;

impl ToWire for OffsetDateTimeTranslator {
    fn to_wire(&self, value: &Native) -> TranslationResult<String> {
        match value {
            Native::OffsetDateTime(at) => Ok(at.to_rfc3339()),
            other => Err(other.mismatch(names::OFFSET_DATETIME)),
        }
    }
}

impl FromWire for OffsetDateTimeTranslator {
    fn from_wire(&self, text: &str) -> TranslationResult<Native> {
        DateTime::parse_from_rfc3339(text.trim())
            .map(Native::OffsetDateTime)
            .map_err(|e| TranslationError::malformed(names::OFFSET_DATETIME, text, e))
    }
}
