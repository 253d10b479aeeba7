//! Contacts file handle and atomic writes.
//!
//! Writes never leave a half-written contacts file behind:
//! content goes to a temp file, is synced to disk, then renamed over the
//! target.
//!
//! The line format has no room for birth dates or released ids, so they
//! live in JSON sidecars next to the contacts file:
//!
//! - `contacts.txt.birthdays.json`: known birth dates keyed by contact id
//! - `contacts.txt.free.json`: ids freed by `remove`, reused first by `add`
//!
//! A sidecar is removed when it would be empty.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::BirthDate;
use crate::registry::Registry;

const BIRTHDAYS_SUFFIX: &str = ".birthdays.json";
const FREE_IDS_SUFFIX: &str = ".free.json";

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_ref())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// The operator's contacts file.
#[derive(Debug, Clone)]
pub struct ContactsFile {
    path: PathBuf,
}

impl ContactsFile {
    /// Open an existing contacts file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContactsFileNotFound` if nothing exists at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::ContactsFileNotFound { path });
        }
        Ok(Self { path })
    }

    /// Create an empty contacts file.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyInitialized` if the file exists and `force` is
    /// not set, or an I/O error if it cannot be written.
    pub fn create(path: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let path = path.into();
        if path.exists() && !force {
            return Err(Error::AlreadyInitialized { path });
        }
        atomic_write(&path, "")?;
        for suffix in [BIRTHDAYS_SUFFIX, FREE_IDS_SUFFIX] {
            remove_if_exists(&sidecar_path(&path, suffix))?;
        }
        info!(path = %path.display(), "created contacts file");
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the birth-date sidecar.
    #[must_use]
    pub fn birthdays_path(&self) -> PathBuf {
        sidecar_path(&self.path, BIRTHDAYS_SUFFIX)
    }

    /// Path of the freed-id sidecar.
    #[must_use]
    pub fn free_ids_path(&self) -> PathBuf {
        sidecar_path(&self.path, FREE_IDS_SUFFIX)
    }

    /// Read the file and hydrate a registry from it.
    ///
    /// Birth dates from the sidecar are applied to contacts that exist;
    /// entries for other ids are dropped. Freed ids are restored unless a
    /// contact in the file already uses them.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read as UTF-8 text, or a
    /// JSON error if a sidecar is corrupt.
    pub fn load(&self) -> Result<Registry> {
        let text = fs::read_to_string(&self.path)?;
        let mut registry = Registry::from_text(&text);

        let birthdays = self.birthdays_path();
        if birthdays.is_file() {
            let dates: BTreeMap<u32, BirthDate> =
                serde_json::from_str(&fs::read_to_string(&birthdays)?)?;
            registry.apply_birth_dates(&dates);
        }

        let free = self.free_ids_path();
        if free.is_file() {
            let ids: BTreeSet<u32> = serde_json::from_str(&fs::read_to_string(&free)?)?;
            registry.restore_free_ids(&ids);
        }

        debug!(
            path = %self.path.display(),
            contacts = registry.len(),
            "loaded contacts file"
        );
        Ok(registry)
    }

    /// Overwrite the file with the registry contents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        atomic_write(&self.path, &registry.to_text())?;

        let dates = registry.birth_dates();
        if dates.is_empty() {
            remove_if_exists(&self.birthdays_path())?;
        } else {
            atomic_write(&self.birthdays_path(), serde_json::to_string_pretty(&dates)?)?;
        }

        let free = registry.free_ids();
        if free.is_empty() {
            remove_if_exists(&self.free_ids_path())?;
        } else {
            atomic_write(&self.free_ids_path(), serde_json::to_string(free)?)?;
        }

        debug!(
            path = %self.path.display(),
            contacts = registry.len(),
            "saved contacts file"
        );
        Ok(())
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NewContact;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("contacts.txt");

        atomic_write(&path, "line 1\nline 2\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line 1\nline 2\n");
        assert!(!temp_dir.path().join("nested").join("contacts.txt.tmp").exists());
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ContactsFile::open(temp_dir.path().join("missing.txt"));
        assert!(matches!(result, Err(Error::ContactsFileNotFound { .. })));
    }

    #[test]
    fn test_create_refuses_to_clobber() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(&path, "[0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n").unwrap();

        assert!(matches!(
            ContactsFile::create(&path, false),
            Err(Error::AlreadyInitialized { .. })
        ));
        ContactsFile::create(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_load_save_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(
            &path,
            "# exported by hand\n\
             [1] [Анна] [Смирнова] [+79161234567] [anna@mail.ru]\n\
             broken line\n\
             [1] [Петр] [Петров] [+79000000000] [petr@ya.ru]\n",
        )
        .unwrap();

        let file = ContactsFile::open(&path).unwrap();
        let mut registry = file.load().unwrap();
        assert_eq!(registry.len(), 1);

        registry
            .add(&NewContact {
                first_name: "Иван".into(),
                second_name: "Иванов".into(),
                phone: "+79991234567".into(),
                email: "ivan@test.ru".into(),
            })
            .unwrap();
        file.save(&registry).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[1] [Анна] [Смирнова] [+79161234567] [anna@mail.ru]\n\
             [0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n"
        );
    }

    #[test]
    fn test_birth_dates_survive_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        let file = ContactsFile::create(&path, false).unwrap();

        let mut registry = file.load().unwrap();
        let id = registry
            .add(&NewContact {
                first_name: "Анна".into(),
                second_name: "Смирнова".into(),
                phone: "+79161234567".into(),
                email: "anna@mail.ru".into(),
            })
            .unwrap();
        registry.set_date_of_birth(id, "15.06").unwrap();
        file.save(&registry).unwrap();

        // the line itself stays five fields
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[0] [Анна] [Смирнова] [+79161234567] [anna@mail.ru]\n"
        );
        assert!(temp_dir.path().join("contacts.txt.birthdays.json").is_file());

        let reloaded = file.load().unwrap();
        assert_eq!(
            reloaded.get(id).unwrap().date_of_birth,
            BirthDate::DayMonth { day: 15, month: 6 }
        );

        let mut cleared = reloaded;
        cleared.set_date_of_birth(id, "").unwrap();
        file.save(&cleared).unwrap();
        assert!(!file.birthdays_path().exists());
    }

    #[test]
    fn test_force_create_drops_birth_dates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(&path, "[0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n").unwrap();
        fs::write(temp_dir.path().join("contacts.txt.birthdays.json"), r#"{"0":"01.01"}"#).unwrap();

        let file = ContactsFile::create(&path, true).unwrap();
        assert!(!file.birthdays_path().exists());
    }

    #[test]
    fn test_freed_ids_survive_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(
            &path,
            "[0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n\
             [2] [Анна] [Смирнова] [+79161234567] [anna@mail.ru]\n\
             [5] [Петр] [Петров] [+79000000000] [petr@ya.ru]\n",
        )
        .unwrap();
        let file = ContactsFile::open(&path).unwrap();

        let mut registry = file.load().unwrap();
        registry.remove(5).unwrap();
        file.save(&registry).unwrap();
        assert_eq!(fs::read_to_string(file.free_ids_path()).unwrap(), "[5]");

        let mut reloaded = file.load().unwrap();
        let id = reloaded
            .add(&NewContact {
                first_name: "Олег".into(),
                second_name: "Олегов".into(),
                phone: "+70000000009".into(),
                email: "o@x.ru".into(),
            })
            .unwrap();
        assert_eq!(id, 5);
        file.save(&reloaded).unwrap();
        assert!(!file.free_ids_path().exists());
    }

    #[test]
    fn test_stale_free_ids_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(&path, "[3] [Иван] [Иванов] [+79991234567] [ivan@test.ru]\n").unwrap();
        fs::write(temp_dir.path().join("contacts.txt.free.json"), "[3, 7]").unwrap();

        let registry = ContactsFile::open(&path).unwrap().load().unwrap();
        assert_eq!(registry.free_ids().iter().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_force_create_drops_free_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.txt");
        fs::write(&path, "").unwrap();
        fs::write(temp_dir.path().join("contacts.txt.free.json"), "[4]").unwrap();

        let file = ContactsFile::create(&path, true).unwrap();
        assert!(!file.free_ids_path().exists());
        assert!(file.load().unwrap().free_ids().is_empty());
    }
}
