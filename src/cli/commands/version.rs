//! Version command: build info plus the files this invocation would use.

use crate::cli::OutputFormat;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::storage::ContactsFile;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct VersionOutput {
    binary: &'static str,
    version: &'static str,
    build: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    contacts_file: Option<FileInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_path: Option<String>,
}

#[derive(Serialize)]
struct FileInfo {
    path: PathBuf,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    birthdays: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    free_ids: Option<PathBuf>,
}

/// Print the version, the resolved contacts file and the sync target.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    // a missing file is reported, not an error
    let contacts_file = file.filter(|p| !p.as_os_str().is_empty()).map(|path| {
        let handle = ContactsFile::open(path).ok();
        FileInfo {
            path: path.clone(),
            exists: handle.is_some(),
            birthdays: handle.as_ref().map(ContactsFile::birthdays_path).filter(|p| p.is_file()),
            free_ids: handle.as_ref().map(ContactsFile::free_ids_path).filter(|p| p.is_file()),
        }
    });

    let output = VersionOutput {
        binary: super::completions::BIN_NAME,
        version: env!("CARGO_PKG_VERSION"),
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
        contacts_file,
        remote_path: SyncConfig::load().ok().map(|c| c.remote_path),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} version {} ({})", output.binary, output.version, output.build);
    if let Some(info) = &output.contacts_file {
        let state = if info.exists { "" } else { " (missing)" };
        println!("Contacts: {}{state}", info.path.display());
    }
    if let Some(remote) = &output.remote_path {
        println!("Remote:   {remote}");
    }
    Ok(())
}
