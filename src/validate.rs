//! Field patterns and field-name resolution.
//!
//! Every contact field has one pattern, shared by the line codec, `add`,
//! `edit` and the birth-date setter. Field names resolve in three tiers:
//! exact match → synonym lookup (English and Russian labels) → error with
//! the closest suggestion.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Field patterns ───────────────────────────────────────────

/// Capitalised name: one uppercase Latin/Cyrillic letter, then lowercase letters.
pub const NAME_PATTERN: &str = "[A-ZА-Я][a-zа-я]+";

/// `+7` followed by ten digits.
pub const PHONE_PATTERN: &str = r"\+7[0-9]{10}";

pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// `dd.mm`; the day range does not depend on the month.
pub const BIRTH_DATE_PATTERN: &str = r"(0[1-9]|[12][0-9]|3[01])\.(0[1-9]|1[0-2])";

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^{pattern}$")).expect("field pattern is a valid regex")
}

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| anchored(NAME_PATTERN));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| anchored(PHONE_PATTERN));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| anchored(EMAIL_PATTERN));
pub(crate) static BIRTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| anchored(BIRTH_DATE_PATTERN));

// ── Field ────────────────────────────────────────────────────

/// A contact field addressable by edit, search, filter and sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    SecondName,
    Phone,
    Email,
    DateOfBirth,
}

impl Field {
    pub const ALL: [Self; 5] = [
        Self::FirstName,
        Self::SecondName,
        Self::Phone,
        Self::Email,
        Self::DateOfBirth,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::SecondName => "second_name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::DateOfBirth => "date_of_birth",
        }
    }

    /// Expected input shape, shown when validation fails.
    #[must_use]
    pub const fn format_hint(&self) -> &'static str {
        match self {
            Self::FirstName | Self::SecondName => {
                "Names start with an uppercase letter followed by lowercase letters (e.g. Anna, Иван)"
            }
            Self::Phone => "Phone format: +7 followed by 10 digits (e.g. +79161234567)",
            Self::Email => "Email format: user@example.ru",
            Self::DateOfBirth => "Birth date format: dd.mm (e.g. 15.06), or empty for unknown",
        }
    }

    /// Whether `search` may target this field.
    #[must_use]
    pub const fn is_searchable(&self) -> bool {
        matches!(self, Self::FirstName | Self::SecondName | Self::Phone)
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::FirstName | Self::SecondName => &NAME_RE,
            Self::Phone => &PHONE_RE,
            Self::Email => &EMAIL_RE,
            Self::DateOfBirth => &BIRTH_DATE_RE,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        normalize_field(s).map_err(|(input, suggestion)| Error::UnknownField { input, suggestion })
    }
}

/// Check `value` against the pattern of `field`.
///
/// Surrounding whitespace is ignored; the trimmed value is returned.
///
/// # Errors
///
/// Returns `Error::Validation` if the trimmed value does not match.
pub fn validate_field(field: Field, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if field.pattern().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(Error::Validation {
            field,
            value: value.to_string(),
        })
    }
}

// ── Synonym map ──────────────────────────────────────────────

pub static FIELD_SYNONYMS: LazyLock<HashMap<&str, Field>> = LazyLock::new(|| {
    [
        ("first", Field::FirstName),
        ("firstname", Field::FirstName),
        ("name", Field::FirstName),
        ("given", Field::FirstName),
        ("имя", Field::FirstName),
        ("second", Field::SecondName),
        ("secondname", Field::SecondName),
        ("last", Field::SecondName),
        ("last_name", Field::SecondName),
        ("lastname", Field::SecondName),
        ("surname", Field::SecondName),
        ("фамилия", Field::SecondName),
        ("tel", Field::Phone),
        ("telephone", Field::Phone),
        ("mobile", Field::Phone),
        ("телефон", Field::Phone),
        ("mail", Field::Email),
        ("e_mail", Field::Email),
        ("почта", Field::Email),
        ("birthday", Field::DateOfBirth),
        ("birth_date", Field::DateOfBirth),
        ("dob", Field::DateOfBirth),
        ("дата_рождения", Field::DateOfBirth),
        ("день_рождения", Field::DateOfBirth),
    ]
    .into_iter()
    .collect()
});

/// Normalize a field name via exact match or synonym lookup.
///
/// Case, spaces and hyphens are ignored, so `Дата рождения`, `date-of-birth`
/// and `DOB` all resolve. Returns the original input and an optional
/// suggestion on failure.
pub fn normalize_field(input: &str) -> std::result::Result<Field, (String, Option<String>)> {
    let key: String = input
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    // Tier 1: canonical name
    if let Some(field) = Field::ALL.into_iter().find(|f| f.as_str() == key) {
        return Ok(field);
    }

    // Tier 2: synonym lookup
    if let Some(&field) = FIELD_SYNONYMS.get(key.as_str()) {
        return Ok(field);
    }

    // Tier 3: closest suggestion
    Err((input.to_string(), find_closest_field(&key)))
}

fn find_closest_field(input: &str) -> Option<String> {
    let canonical = Field::ALL.iter().map(|f| (f.as_str(), *f));
    let synonyms = FIELD_SYNONYMS.iter().map(|(k, f)| (*k, *f));

    canonical
        .chain(synonyms)
        .map(|(name, field)| (levenshtein_distance(input, name), field))
        .filter(|(dist, _)| *dist <= 3)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, field)| field.as_str().to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
