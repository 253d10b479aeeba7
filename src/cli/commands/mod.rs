//! Command implementations.
//!
//! Each handler resolves the contacts file, loads the registry, runs one
//! operation and, for mutating commands, writes the registry back only if
//! the operation succeeded.

pub mod completions;
pub mod contact;
pub mod init;
pub mod query;
pub mod sync;
pub mod version;

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::resolve_contacts_path;
use crate::error::Result;
use crate::model::Contact;
use crate::storage::ContactsFile;

/// Open the contacts file named by `--file` / `CB_FILE`.
pub(crate) fn open_contacts(file: Option<&PathBuf>) -> Result<ContactsFile> {
    let path = resolve_contacts_path(file.map(PathBuf::as_path))?;
    ContactsFile::open(path)
}

#[derive(Serialize)]
struct ContactListOutput<'a> {
    count: usize,
    contacts: &'a [&'a Contact],
}

/// Print contacts as a table, JSON or CSV.
pub(crate) fn print_contacts(contacts: &[&Contact], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            println!("id,first_name,second_name,phone,email,date_of_birth");
            for c in contacts {
                println!(
                    "{},{},{},{},{},{}",
                    c.id,
                    crate::csv_escape(&c.first_name),
                    crate::csv_escape(&c.second_name),
                    crate::csv_escape(&c.phone),
                    crate::csv_escape(&c.email),
                    c.date_of_birth
                );
            }
        }
        OutputFormat::Json => {
            let output = ContactListOutput {
                count: contacts.len(),
                contacts,
            };
            println!("{}", serde_json::to_string(&output)?);
        }
        OutputFormat::Table => {
            if contacts.is_empty() {
                println!("No contacts.");
                return Ok(());
            }
            println!("Contacts ({}):", contacts.len());
            println!();
            for c in contacts {
                print_contact_row(c);
            }
        }
    }
    Ok(())
}

/// One table row: `[id] First Second  phone  email  dd.mm`.
pub(crate) fn print_contact_row(contact: &Contact) {
    let name = format!("{} {}", contact.first_name, contact.second_name);
    let birthday = if contact.date_of_birth.is_known() {
        contact.date_of_birth.to_string().normal()
    } else {
        contact.date_of_birth.to_string().dimmed()
    };
    println!(
        "{} {} {} {} {}",
        format!("[{}]", contact.id).cyan(),
        format!("{name:<28}").bold(),
        format!("{:<13}", contact.phone),
        format!("{:<30}", contact.email),
        birthday
    );
}
