//! In-memory contact registry.
//!
//! The registry owns the ordered contact list plus two id sets:
//!
//! - `used`: ids of live contacts
//! - `free`: ids released by `remove`, handed out again first by `add`
//!
//! # Invariants
//! - `used ∩ free = ∅`
//! - every contact's id is in `used`, and no two contacts share an id
//! - insertion order is preserved for listing
//!
//! The registry never reads input or prints; the CLI shell supplies strings
//! and renders results.

mod allocator;
mod query;

pub use allocator::next_id;
pub use query::{BirthdayReport, InvalidBirthday, NameShare, QueryOutcome, UpcomingBirthday};

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::codec;
use crate::error::{Error, Result};
use crate::model::{BirthDate, Contact};
use crate::validate::{validate_field, Field};

/// Raw field values for a new contact, as typed by the operator.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub first_name: String,
    pub second_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    contacts: Vec<Contact>,
    used: BTreeSet<u32>,
    free: BTreeSet<u32>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from contacts-file text.
    ///
    /// Every match of the line pattern becomes a contact; a repeated id is
    /// dropped (first occurrence wins).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_contacts(codec::decode_all(text))
    }

    /// Hydrate from already decoded contacts, first occurrence of an id wins.
    #[must_use]
    pub fn from_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let mut registry = Self::new();
        for contact in contacts {
            if registry.used.contains(&contact.id) {
                debug!(id = contact.id, "dropping contact with duplicate id");
                continue;
            }
            registry.used.insert(contact.id);
            registry.contacts.push(contact);
        }
        registry
    }

    /// Replace the whole registry with `contacts`.
    ///
    /// The result is a freshly hydrated registry: duplicates are dropped
    /// and the free set starts empty.
    pub fn replace_all(&mut self, contacts: impl IntoIterator<Item = Contact>) {
        *self = Self::from_contacts(contacts);
    }

    /// Encode all contacts in insertion order, one line each.
    #[must_use]
    pub fn to_text(&self) -> String {
        codec::encode_all(&self.contacts)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// All contacts in insertion order.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn used_ids(&self) -> &BTreeSet<u32> {
        &self.used
    }

    #[must_use]
    pub fn free_ids(&self) -> &BTreeSet<u32> {
        &self.free
    }

    /// Validate and append a new contact, returning its id.
    ///
    /// Fields are checked in order (first name, second name, phone, email);
    /// the first failure aborts without touching the registry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` naming the first invalid field.
    pub fn add(&mut self, fields: &NewContact) -> Result<u32> {
        let first_name = validate_field(Field::FirstName, &fields.first_name)?;
        let second_name = validate_field(Field::SecondName, &fields.second_name)?;
        let phone = validate_field(Field::Phone, &fields.phone)?;
        let email = validate_field(Field::Email, &fields.email)?;

        let id = next_id(&self.used, &mut self.free);
        self.used.insert(id);
        self.contacts
            .push(Contact::new(id, first_name, second_name, phone, email));
        debug!(id, "contact added");
        Ok(id)
    }

    /// Remove a contact and release its id for reuse.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContactNotFound` if no contact has this id.
    pub fn remove(&mut self, id: u32) -> Result<Contact> {
        let index = self
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::ContactNotFound { id })?;

        let contact = self.contacts.remove(index);
        self.used.remove(&id);
        self.free.insert(id);
        debug!(id, "contact removed");
        Ok(contact)
    }

    /// Change one field of a contact.
    ///
    /// The value must match the same pattern `add` uses. A birth date edit
    /// follows the birth-date rules (blank means unknown).
    ///
    /// # Errors
    ///
    /// Returns `Error::ContactNotFound` or `Error::Validation`; on error the
    /// contact is unchanged.
    pub fn edit(&mut self, id: u32, field: Field, value: &str) -> Result<()> {
        let contact = self.get_mut(id)?;
        let slot = match field {
            Field::DateOfBirth => return contact.set_date_of_birth(value),
            Field::FirstName => &mut contact.first_name,
            Field::SecondName => &mut contact.second_name,
            Field::Phone => &mut contact.phone,
            Field::Email => &mut contact.email,
        };
        *slot = validate_field(field, value)?;
        Ok(())
    }

    /// Set or clear (blank input) a contact's birth date.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContactNotFound`, or `Error::Validation` for a value
    /// that is neither blank nor `dd.mm` (the stored date is kept).
    pub fn set_date_of_birth(&mut self, id: u32, value: &str) -> Result<()> {
        self.get_mut(id)?.set_date_of_birth(value)
    }

    /// Known birth dates keyed by contact id.
    #[must_use]
    pub fn birth_dates(&self) -> BTreeMap<u32, BirthDate> {
        self.contacts
            .iter()
            .filter(|c| c.date_of_birth.is_known())
            .map(|c| (c.id, c.date_of_birth))
            .collect()
    }

    /// Restore stored birth dates; ids with no live contact are ignored.
    pub fn apply_birth_dates(&mut self, dates: &BTreeMap<u32, BirthDate>) {
        for contact in &mut self.contacts {
            if let Some(date) = dates.get(&contact.id) {
                contact.date_of_birth = *date;
            }
        }
    }

    /// Restore ids released by earlier removals; ids now in use are skipped.
    pub fn restore_free_ids(&mut self, ids: &BTreeSet<u32>) {
        self.free
            .extend(ids.iter().copied().filter(|id| !self.used.contains(id)));
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Contact> {
        self.contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::ContactNotFound { id })
    }
}
