//! Contact model.
//!
//! A contact is identified by its integer id; every other field is mutable
//! in place. The birth date is kept in memory only and is not part of the
//! line format.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::validate::{BIRTH_DATE_RE, Field};

/// Sentinel text for an unset birth date.
pub const UNKNOWN_BIRTH_DATE: &str = "unknown";

/// A day-month birth date without a year.
///
/// The day is range-checked by the `dd.mm` pattern only, so `31.02` is a
/// representable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BirthDate {
    #[default]
    Unknown,
    DayMonth {
        day: u32,
        month: u32,
    },
}

impl BirthDate {
    /// Parse operator input: blank means unknown, otherwise `dd.mm`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the value is not blank and not `dd.mm`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == UNKNOWN_BIRTH_DATE {
            return Ok(Self::Unknown);
        }

        let invalid = || Error::Validation {
            field: Field::DateOfBirth,
            value: value.to_string(),
        };

        let caps = BIRTH_DATE_RE.captures(trimmed).ok_or_else(invalid)?;
        let day = caps[1].parse().map_err(|_| invalid())?;
        let month = caps[2].parse().map_err(|_| invalid())?;
        Ok(Self::DayMonth { day, month })
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::DayMonth { .. })
    }

    /// `(month, day)` for calendar ordering; `None` when unknown.
    #[must_use]
    pub const fn calendar_key(&self) -> Option<(u32, u32)> {
        match self {
            Self::Unknown => None,
            Self::DayMonth { day, month } => Some((*month, *day)),
        }
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(UNKNOWN_BIRTH_DATE),
            Self::DayMonth { day, month } => write!(f, "{day:02}.{month:02}"),
        }
    }
}

impl From<BirthDate> for String {
    fn from(value: BirthDate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BirthDate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

/// A contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique within a registry
    pub id: u32,

    pub first_name: String,

    pub second_name: String,

    /// `+7` followed by ten digits
    pub phone: String,

    pub email: String,

    #[serde(default)]
    pub date_of_birth: BirthDate,
}

impl Contact {
    /// Create a contact with an unknown birth date.
    pub fn new(
        id: u32,
        first_name: impl Into<String>,
        second_name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            second_name: second_name.into(),
            phone: phone.into(),
            email: email.into(),
            date_of_birth: BirthDate::Unknown,
        }
    }

    /// Set the birth date from operator input.
    ///
    /// Blank input resets to unknown. A malformed value is rejected with a
    /// warning and the current birth date is kept.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a malformed value.
    pub fn set_date_of_birth(&mut self, value: &str) -> Result<()> {
        match BirthDate::parse(value) {
            Ok(date) => {
                self.date_of_birth = date;
                Ok(())
            }
            Err(e) => {
                warn!(id = self.id, value, "rejected birth date, expected dd.mm");
                Err(e)
            }
        }
    }

    /// Text of `field` as shown and matched by search/filter/sort.
    #[must_use]
    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::FirstName => self.first_name.clone(),
            Field::SecondName => self.second_name.clone(),
            Field::Phone => self.phone.clone(),
            Field::Email => self.email.clone(),
            Field::DateOfBirth => self.date_of_birth.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anna() -> Contact {
        Contact::new(1, "Анна", "Смирнова", "+79161234567", "anna@mail.ru")
    }

    #[test]
    fn test_new_contact_has_unknown_birth_date() {
        let contact = anna();
        assert_eq!(contact.date_of_birth, BirthDate::Unknown);
        assert_eq!(contact.date_of_birth.to_string(), "unknown");
    }

    #[test]
    fn test_set_date_of_birth() {
        let mut contact = anna();
        contact.set_date_of_birth("15.06").unwrap();
        assert_eq!(
            contact.date_of_birth,
            BirthDate::DayMonth { day: 15, month: 6 }
        );
        assert_eq!(contact.field_text(Field::DateOfBirth), "15.06");
    }

    #[test]
    fn test_blank_birth_date_resets_to_unknown() {
        let mut contact = anna();
        contact.set_date_of_birth("01.01").unwrap();
        contact.set_date_of_birth("   ").unwrap();
        assert_eq!(contact.date_of_birth, BirthDate::Unknown);
    }

    #[test]
    fn test_invalid_birth_date_leaves_field_unchanged() {
        let mut contact = anna();
        contact.set_date_of_birth("20.12").unwrap();

        assert!(contact.set_date_of_birth("2024-12-20").is_err());
        assert_eq!(
            contact.date_of_birth,
            BirthDate::DayMonth { day: 20, month: 12 }
        );

        let mut fresh = anna();
        assert!(fresh.set_date_of_birth("32.01").is_err());
        assert_eq!(fresh.date_of_birth, BirthDate::Unknown);
    }

    #[test]
    fn test_birth_date_serde_as_text() {
        let mut contact = anna();
        contact.set_date_of_birth("05.03").unwrap();
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["date_of_birth"], "05.03");

        let back: Contact = serde_json::from_value(json).unwrap();
        assert_eq!(back, contact);
    }
}
