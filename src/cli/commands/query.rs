//! Read-only query commands (search, filter, sort, upcoming, breakdown).

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::model::Contact;
use crate::registry::{BirthdayReport, QueryOutcome};
use crate::validate::Field;
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_contacts, print_contact_row, print_contacts};

#[derive(Serialize)]
struct QueryOutput<'a> {
    outcome: &'static str,
    count: usize,
    contacts: &'a [&'a Contact],
}

/// Search by first name, second name or phone.
///
/// # Errors
///
/// Returns `Error::UnknownField`, `Error::FieldNotAllowed`, or
/// `Error::InvalidArgument` for a blank query.
pub fn search(field: &str, query: &str, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let field: Field = field.parse()?;
    let registry = open_contacts(file)?.load()?;
    print_outcome(registry.search(field, query)?, format)
}

/// Filter by any field.
///
/// # Errors
///
/// Returns `Error::UnknownField` for an unrecognized field name, or
/// `Error::InvalidArgument` for a blank query.
pub fn filter(field: &str, query: &str, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let field: Field = field.parse()?;
    let registry = open_contacts(file)?.load()?;
    print_outcome(registry.filter(field, query)?, format)
}

/// List contacts ordered by a field.
///
/// # Errors
///
/// Returns `Error::UnknownField` for an unrecognized field name.
pub fn sort(field: &str, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let field: Field = field.parse()?;
    let registry = open_contacts(file)?.load()?;
    print_contacts(&registry.sorted_by(field), format)
}

/// Show birthdays in the week containing `today` (default: the local date).
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if `today` is not `YYYY-MM-DD`.
pub fn upcoming(today: Option<&str>, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let today = match today {
        Some(raw) => parse_day(raw)?,
        None => chrono::Local::now().date_naive(),
    };
    let registry = open_contacts(file)?.load()?;
    let report = registry.upcoming_birthdays(today);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::Csv => {
            println!("id,first_name,second_name,date_of_birth,date");
            for u in &report.upcoming {
                println!(
                    "{},{},{},{},{}",
                    u.contact.id,
                    crate::csv_escape(&u.contact.first_name),
                    crate::csv_escape(&u.contact.second_name),
                    u.contact.date_of_birth,
                    u.date
                );
            }
        }
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

/// Show the ten most common first names.
///
/// # Errors
///
/// Returns an error if the contacts file cannot be read.
pub fn breakdown(file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let registry = open_contacts(file)?.load()?;
    let shares = registry.name_breakdown();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&shares)?),
        OutputFormat::Csv => {
            println!("name,count,percentage");
            for share in &shares {
                println!(
                    "{},{},{:.1}",
                    crate::csv_escape(&share.name),
                    share.count,
                    share.percentage
                );
            }
        }
        OutputFormat::Table => {
            if shares.is_empty() {
                println!("No contacts.");
                return Ok(());
            }
            println!("First names ({} contacts):", registry.len());
            println!();
            for share in &shares {
                println!(
                    "  {} {:>4} {:>6}",
                    format!("{:<20}", share.name).bold(),
                    share.count,
                    format!("{:.1}%", share.percentage)
                );
            }
        }
    }
    Ok(())
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidArgument(format!("--today '{raw}': {e} (expected YYYY-MM-DD)")))
}

fn print_outcome(outcome: QueryOutcome<'_>, format: OutputFormat) -> Result<()> {
    let label = match &outcome {
        QueryOutcome::EmptyRegistry => "empty_registry",
        QueryOutcome::NoMatches => "no_matches",
        QueryOutcome::Matches(_) => "matches",
    };

    match (format, outcome) {
        (OutputFormat::Json, outcome) => {
            let contacts = outcome.into_contacts();
            let output = QueryOutput {
                outcome: label,
                count: contacts.len(),
                contacts: &contacts,
            };
            println!("{}", serde_json::to_string(&output)?);
        }
        (_, QueryOutcome::Matches(contacts)) => print_contacts(&contacts, format)?,
        (OutputFormat::Csv, _) => print_contacts(&[], format)?,
        (OutputFormat::Table, QueryOutcome::EmptyRegistry) => println!("The contact book is empty."),
        (OutputFormat::Table, QueryOutcome::NoMatches) => println!("No contacts match."),
    }
    Ok(())
}

fn print_report(report: &BirthdayReport<'_>) {
    println!(
        "Birthdays {} to {}:",
        report.week_start.format("%d.%m.%Y"),
        report.week_end.format("%d.%m.%Y")
    );
    println!();
    if report.upcoming.is_empty() {
        println!("  none this week");
    }
    for u in &report.upcoming {
        print!("  {} ", u.date.format("%a %d.%m").to_string().yellow());
        print_contact_row(u.contact);
    }
    for bad in &report.invalid {
        println!(
            "  {} contact [{}]: {} does not exist in {}",
            "skipped".red(),
            bad.id,
            bad.date_of_birth,
            bad.year
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        assert_eq!(
            parse_day("2025-06-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
        );
        assert!(matches!(parse_day("10.06.2025"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_field_is_rejected_before_reading() {
        // no file needed: the field is checked first
        let err = sort("colour", None, OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }
}
