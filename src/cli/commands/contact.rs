//! Contact command implementations (list, add, edit, remove, birthday).

use crate::cli::{AddArgs, OutputFormat};
use crate::error::Result;
use crate::model::{BirthDate, Contact};
use crate::registry::NewContact;
use crate::validate::Field;
use serde::Serialize;
use std::path::PathBuf;

use super::{open_contacts, print_contacts};

/// Output for add, edit and birthday.
#[derive(Serialize)]
struct ContactOutput<'a> {
    action: &'static str,
    contact: &'a Contact,
}

/// List all contacts in insertion order.
///
/// # Errors
///
/// Returns an error if the contacts file cannot be opened or read.
pub fn list(file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let registry = open_contacts(file)?.load()?;
    let contacts: Vec<&Contact> = registry.contacts().iter().collect();
    print_contacts(&contacts, format)
}

/// Add a contact, optionally with a birth date.
///
/// # Errors
///
/// Returns `Error::Validation` for the first invalid field; the file is
/// left untouched.
pub fn add(args: &AddArgs, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let contacts_file = open_contacts(file)?;
    let mut registry = contacts_file.load()?;

    // reject a bad birth date before anything is allocated
    let birthday = args.birthday.as_deref().map(BirthDate::parse).transpose()?;

    let id = registry.add(&NewContact {
        first_name: args.first_name.clone(),
        second_name: args.second_name.clone(),
        phone: args.phone.clone(),
        email: args.email.clone(),
    })?;
    if let Some(date) = birthday {
        registry.set_date_of_birth(id, &date.to_string())?;
    }
    contacts_file.save(&registry)?;

    print_changed("added", registry.get(id), format)
}

/// Change one field of a contact.
///
/// # Errors
///
/// Returns `Error::UnknownField`, `Error::ContactNotFound` or
/// `Error::Validation`.
pub fn edit(
    id: u32,
    field: &str,
    value: &str,
    file: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let field: Field = field.parse()?;
    let contacts_file = open_contacts(file)?;
    let mut registry = contacts_file.load()?;

    registry.edit(id, field, value)?;
    contacts_file.save(&registry)?;

    print_changed("updated", registry.get(id), format)
}

/// Remove a contact.
///
/// # Errors
///
/// Returns `Error::ContactNotFound` if no contact has this id.
pub fn remove(id: u32, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let contacts_file = open_contacts(file)?;
    let mut registry = contacts_file.load()?;

    let removed = registry.remove(id)?;
    contacts_file.save(&registry)?;

    print_changed("removed", Some(&removed), format)
}

/// Set a birth date, or clear it when `date` is omitted or blank.
///
/// # Errors
///
/// Returns `Error::ContactNotFound` or `Error::Validation`.
pub fn birthday(
    id: u32,
    date: Option<&str>,
    file: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let contacts_file = open_contacts(file)?;
    let mut registry = contacts_file.load()?;

    registry.set_date_of_birth(id, date.unwrap_or(""))?;
    contacts_file.save(&registry)?;

    print_changed("updated", registry.get(id), format)
}

fn print_changed(action: &'static str, contact: Option<&Contact>, format: OutputFormat) -> Result<()> {
    let Some(contact) = contact else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            let output = ContactOutput { action, contact };
            println!("{}", serde_json::to_string(&output)?);
        }
        OutputFormat::Csv => print_contacts(&[contact], format)?,
        OutputFormat::Table => {
            println!(
                "{} contact [{}] {} {} ({})",
                capitalize(action),
                contact.id,
                contact.first_name,
                contact.second_name,
                contact.date_of_birth
            );
        }
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::ContactsFile;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        ContactsFile::create(&path, false).unwrap();
        (temp_dir, path)
    }

    fn add_args(first: &str, birthday: Option<&str>) -> AddArgs {
        AddArgs {
            first_name: first.into(),
            second_name: "Иванов".into(),
            phone: "+79991234567".into(),
            email: "ivan@test.ru".into(),
            birthday: birthday.map(Into::into),
        }
    }

    #[test]
    fn test_add_with_birthday_persists() {
        let (_dir, path) = setup();
        add(&add_args("Иван", Some("15.06")), Some(&path), OutputFormat::Json).unwrap();

        let registry = ContactsFile::open(&path).unwrap().load().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.contacts()[0].date_of_birth.to_string(), "15.06");
    }

    #[test]
    fn test_failed_add_leaves_file_untouched() {
        let (_dir, path) = setup();
        add(&add_args("Иван", None), Some(&path), OutputFormat::Json).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = add(&add_args("иван", None), Some(&path), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Validation { field: Field::FirstName, .. }));

        let err = add(&add_args("Олег", Some("32.01")), Some(&path), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Validation { field: Field::DateOfBirth, .. }));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_edit_unknown_field() {
        let (_dir, path) = setup();
        add(&add_args("Иван", None), Some(&path), OutputFormat::Json).unwrap();

        let err = edit(0, "nmae", "Олег", Some(&path), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }

    #[test]
    fn test_remove_then_birthday_on_missing() {
        let (_dir, path) = setup();
        add(&add_args("Иван", None), Some(&path), OutputFormat::Json).unwrap();
        remove(0, Some(&path), OutputFormat::Json).unwrap();

        let err = birthday(0, Some("01.01"), Some(&path), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::ContactNotFound { id: 0 }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("removed"), "Removed");
        assert_eq!(capitalize(""), "");
    }
}
