//! Bracketed line format for contacts.
//!
//! One contact per line:
//!
//! ```text
//! [<id>] [<FirstName>] [<SecondName>] [<+7##########>] [<local@domain.tld>]
//! ```
//!
//! The same format is used for the local contacts file and the remote
//! object. Birth dates are not encoded, so decoded contacts always start
//! with an unknown birth date.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::Contact;
use crate::validate::{EMAIL_PATTERN, NAME_PATTERN, PHONE_PATTERN};

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"\[([0-9]+)\][ \t]+\[({NAME_PATTERN})\][ \t]+\[({NAME_PATTERN})\][ \t]+\[({PHONE_PATTERN})\][ \t]+\[({EMAIL_PATTERN})\]"
    );
    Regex::new(&pattern).expect("line pattern is a valid regex")
});

/// Render a contact as one line, without a trailing newline.
#[must_use]
pub fn encode(contact: &Contact) -> String {
    format!(
        "[{}] [{}] [{}] [{}] [{}]",
        contact.id, contact.first_name, contact.second_name, contact.phone, contact.email
    )
}

/// Render contacts as newline-terminated lines.
#[must_use]
pub fn encode_all<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> String {
    let mut out = String::new();
    for contact in contacts {
        out.push_str(&encode(contact));
        out.push('\n');
    }
    out
}

/// Decode one line.
///
/// The pattern may appear anywhere in the line; surrounding text is ignored.
///
/// # Errors
///
/// Returns `Error::Format` if the line holds no contact (including an id
/// that does not fit in `u32`).
pub fn decode(line: &str) -> Result<Contact> {
    LINE_RE
        .captures(line)
        .and_then(|caps| from_captures(&caps))
        .ok_or_else(|| Error::Format {
            line: line.to_string(),
        })
}

/// Decode every contact found in `blob`.
///
/// Matches are found anywhere in the text, not only at line starts; text
/// between matches is ignored. Duplicate ids are kept here, the registry
/// decides which one wins.
#[must_use]
pub fn decode_all(blob: &str) -> Vec<Contact> {
    LINE_RE
        .captures_iter(blob)
        .filter_map(|caps| {
            let contact = from_captures(&caps);
            if contact.is_none() {
                warn!(text = &caps[0], "skipping contact with out-of-range id");
            }
            contact
        })
        .collect()
}

/// Decode `text` line by line, skipping lines that do not match.
///
/// Used for downloaded objects: every rejected non-blank line is logged.
#[must_use]
pub fn decode_lines(text: &str) -> Vec<Contact> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match decode(line) {
            Ok(contact) => Some(contact),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

fn from_captures(caps: &Captures<'_>) -> Option<Contact> {
    let id = caps[1].parse().ok()?;
    Some(Contact::new(id, &caps[2], &caps[3], &caps[4], &caps[5]))
}
