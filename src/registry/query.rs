//! Read-only views over the registry: search, filter, sort, upcoming
//! birthdays and the first-name breakdown.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::Registry;
use crate::error::{Error, Result};
use crate::model::{BirthDate, Contact};
use crate::validate::Field;

/// Number of groups kept by [`Registry::name_breakdown`].
pub const BREAKDOWN_TOP_N: usize = 10;

/// Result of a search or filter.
///
/// An empty registry and an empty match set are reported differently.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryOutcome<'a> {
    EmptyRegistry,
    NoMatches,
    Matches(Vec<&'a Contact>),
}

impl<'a> QueryOutcome<'a> {
    /// Matching contacts, empty for the two no-result outcomes.
    #[must_use]
    pub fn into_contacts(self) -> Vec<&'a Contact> {
        match self {
            Self::Matches(contacts) => contacts,
            Self::EmptyRegistry | Self::NoMatches => Vec::new(),
        }
    }
}

/// A contact whose birthday falls in the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBirthday<'a> {
    pub contact: &'a Contact,
    /// Next occurrence on or after the reference day
    pub date: NaiveDate,
}

/// A stored day-month pair that does not exist in the year it would fall in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidBirthday {
    pub id: u32,
    pub date_of_birth: BirthDate,
    pub year: i32,
}

/// Upcoming birthdays plus the contacts whose dates could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayReport<'a> {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub upcoming: Vec<UpcomingBirthday<'a>>,
    pub invalid: Vec<InvalidBirthday>,
}

/// One row of the first-name breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameShare {
    pub name: String,
    pub count: usize,
    /// Share of all contacts, rounded to one decimal
    pub percentage: f64,
}

impl Registry {
    /// Case-insensitive substring search on first name, second name or phone.
    ///
    /// # Errors
    ///
    /// Returns `Error::FieldNotAllowed` for email and birth date; use
    /// [`Registry::filter`] for those. Returns `Error::InvalidArgument` for
    /// a blank query on a non-empty registry.
    pub fn search(&self, field: Field, query: &str) -> Result<QueryOutcome<'_>> {
        if !field.is_searchable() {
            return Err(Error::FieldNotAllowed {
                field,
                operation: "search",
            });
        }
        self.matching(field, query)
    }

    /// Case-insensitive substring filter on any field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a blank query on a non-empty
    /// registry.
    pub fn filter(&self, field: Field, query: &str) -> Result<QueryOutcome<'_>> {
        self.matching(field, query)
    }

    fn matching(&self, field: Field, query: &str) -> Result<QueryOutcome<'_>> {
        if self.is_empty() {
            return Ok(QueryOutcome::EmptyRegistry);
        }
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "empty {} query",
                field.as_str()
            )));
        }

        let needle = query.to_lowercase();
        let found: Vec<&Contact> = self
            .contacts
            .iter()
            .filter(|c| c.field_text(field).to_lowercase().contains(&needle))
            .collect();

        Ok(if found.is_empty() {
            QueryOutcome::NoMatches
        } else {
            QueryOutcome::Matches(found)
        })
    }

    /// Contacts ordered by `field` (stable).
    ///
    /// Text fields compare as strings. Birth dates compare in calendar
    /// order with unknown dates last.
    #[must_use]
    pub fn sorted_by(&self, field: Field) -> Vec<&Contact> {
        let mut sorted: Vec<&Contact> = self.contacts.iter().collect();
        match field {
            Field::FirstName => sorted.sort_by(|a, b| a.first_name.cmp(&b.first_name)),
            Field::SecondName => sorted.sort_by(|a, b| a.second_name.cmp(&b.second_name)),
            Field::Phone => sorted.sort_by(|a, b| a.phone.cmp(&b.phone)),
            Field::Email => sorted.sort_by(|a, b| a.email.cmp(&b.email)),
            Field::DateOfBirth => sorted.sort_by_key(|c| {
                let key = c.date_of_birth.calendar_key();
                (key.is_none(), key)
            }),
        }
        sorted
    }

    /// Birthdays in the Monday-to-Sunday week containing `today`.
    ///
    /// Each known birthday is placed on its next occurrence on or after
    /// `today` (next year if this year's has passed). Results are ordered by
    /// that date. A day-month pair that does not exist in the needed year
    /// (29.02 outside leap years, 31.04, ...) is listed in `invalid` instead.
    #[must_use]
    pub fn upcoming_birthdays(&self, today: NaiveDate) -> BirthdayReport<'_> {
        let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        let week_end = week_start + Days::new(6);

        let mut upcoming = Vec::new();
        let mut invalid = Vec::new();

        for contact in &self.contacts {
            let BirthDate::DayMonth { day, month } = contact.date_of_birth else {
                continue;
            };

            match next_occurrence(today, month, day) {
                Ok(date) => {
                    if date >= week_start && date <= week_end {
                        upcoming.push(UpcomingBirthday { contact, date });
                    }
                }
                Err(year) => invalid.push(InvalidBirthday {
                    id: contact.id,
                    date_of_birth: contact.date_of_birth,
                    year,
                }),
            }
        }

        upcoming.sort_by_key(|u| u.date);

        BirthdayReport {
            week_start,
            week_end,
            upcoming,
            invalid,
        }
    }

    /// Share of the ten most common first names.
    ///
    /// Groups are ordered by count, ties keep first-encountered order.
    #[must_use]
    pub fn name_breakdown(&self) -> Vec<NameShare> {
        let mut groups: Vec<(&str, usize)> = Vec::new();
        for contact in &self.contacts {
            match groups.iter_mut().find(|(name, _)| *name == contact.first_name) {
                Some((_, count)) => *count += 1,
                None => groups.push((&contact.first_name, 1)),
            }
        }

        groups.sort_by(|a, b| b.1.cmp(&a.1));

        #[allow(clippy::cast_precision_loss)]
        let total = self.contacts.len() as f64;
        groups
            .into_iter()
            .take(BREAKDOWN_TOP_N)
            .map(|(name, count)| {
                #[allow(clippy::cast_precision_loss)]
                let share = count as f64 / total * 100.0;
                NameShare {
                    name: name.to_string(),
                    count,
                    percentage: (share * 10.0).round_ties_even() / 10.0,
                }
            })
            .collect()
    }
}

/// Next `month`/`day` on or after `today`; `Err(year)` if that date does
/// not exist in the year it would fall in.
fn next_occurrence(today: NaiveDate, month: u32, day: u32) -> std::result::Result<NaiveDate, i32> {
    let year = today.year();
    let this_year = NaiveDate::from_ymd_opt(year, month, day).ok_or(year)?;
    if this_year >= today {
        return Ok(this_year);
    }
    NaiveDate::from_ymd_opt(year + 1, month, day).ok_or(year + 1)
}
