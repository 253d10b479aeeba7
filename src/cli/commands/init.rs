//! Create a contacts file.

use crate::cli::OutputFormat;
use crate::config::resolve_contacts_path;
use crate::error::Result;
use crate::storage::ContactsFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput<'a> {
    path: &'a Path,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `Error::NoContactsFile` without `--file`, `Error::AlreadyInitialized`
/// if the file exists and `force` is not set, or an I/O error.
pub fn execute(file: Option<&PathBuf>, force: bool, format: OutputFormat) -> Result<()> {
    let path = resolve_contacts_path(file.map(PathBuf::as_path))?;
    let contacts_file = ContactsFile::create(path, force)?;

    if format == OutputFormat::Json {
        let output = InitOutput {
            path: contacts_file.path(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Created contacts file: {}", contacts_file.path().display());
    }
    Ok(())
}
